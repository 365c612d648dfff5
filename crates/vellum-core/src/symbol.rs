//! The symbol registry: a read-only lookup table from `(category, name)`
//! pairs to drawable glyph references.
//!
//! A [`Glyph`] is what renderers get back: an accent [`Color`] used for the
//! node border and a short badge string drawn above the node label. The
//! vocabulary is open — embedding applications register their own entries
//! through [`SymbolRegistryBuilder`] — but an unknown pair is always a hard
//! [`UnknownSymbolError`], never a silent fallback.

use std::collections::HashMap;

use thiserror::Error;

use crate::color::Color;

/// The drawable reference resolved for a node's category/name pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    badge: String,
    accent: Color,
}

impl Glyph {
    pub fn new(badge: impl Into<String>, accent: Color) -> Self {
        Self {
            badge: badge.into(),
            accent,
        }
    }

    /// Short badge string drawn above the node label.
    pub fn badge(&self) -> &str {
        &self.badge
    }

    /// Accent color used for the node border and badge.
    pub fn accent(&self) -> &Color {
        &self.accent
    }
}

/// Raised when a `(category, name)` pair has no registration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown symbol: {category}/{name}")]
pub struct UnknownSymbolError {
    pub category: String,
    pub name: String,
}

/// Builder for assembling a [`SymbolRegistry`] before first use.
#[derive(Debug, Default)]
pub struct SymbolRegistryBuilder {
    entries: HashMap<(String, String), Glyph>,
}

impl SymbolRegistryBuilder {
    /// Registers a glyph under the given category and name.
    ///
    /// A later registration for the same pair replaces the earlier one.
    pub fn register(
        mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        glyph: Glyph,
    ) -> Self {
        self.entries.insert((category.into(), name.into()), glyph);
        self
    }

    pub fn build(self) -> SymbolRegistry {
        SymbolRegistry {
            entries: self.entries,
        }
    }
}

/// Read-only mapping from `(category, name)` to [`Glyph`].
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    entries: HashMap<(String, String), Glyph>,
}

impl SymbolRegistry {
    pub fn builder() -> SymbolRegistryBuilder {
        SymbolRegistryBuilder::default()
    }

    /// Looks up the glyph registered for `(category, name)`.
    pub fn lookup(&self, category: &str, name: &str) -> Result<&Glyph, UnknownSymbolError> {
        self.entries
            .get(&(category.to_string(), name.to_string()))
            .ok_or_else(|| UnknownSymbolError {
                category: category.to_string(),
                name: name.to_string(),
            })
    }

    /// The built-in symbol table covering the vocabulary used by typical
    /// infrastructure diagrams.
    pub fn builtin() -> Self {
        let accent = |s: &str| Color::new(s).expect("builtin accent colors are valid");

        let compute = accent("#ed7100");
        let network = accent("#8c4fff");
        let storage = accent("#7aa116");
        let database = accent("#2e73b8");
        let security = accent("#dd344c");
        let client = accent("#232f3e");
        let container = accent("#326ce5");
        let workflow = accent("#24292f");
        let generic = accent("#54606c");

        let mut builder = Self::builder();
        for (category, name, badge, color) in [
            ("compute", "server", "SRV", &compute),
            ("compute", "cluster", "K8S", &compute),
            ("compute", "autoscaling", "ASG", &compute),
            ("compute", "instance", "EC2", &compute),
            ("network", "load-balancer", "LB", &network),
            ("network", "vpc", "VPC", &network),
            ("network", "subnet-public", "PUB", &network),
            ("network", "subnet-private", "PRV", &network),
            ("network", "internet-gateway", "IGW", &network),
            ("network", "nat-gateway", "NAT", &network),
            ("network", "dns", "DNS", &network),
            ("network", "firewall", "FW", &security),
            ("storage", "disk", "EBS", &storage),
            ("storage", "object-store", "S3", &storage),
            ("storage", "volume", "PV", &storage),
            ("database", "relational", "SQL", &database),
            ("security", "iam", "IAM", &security),
            ("client", "users", "USR", &client),
            ("client", "mobile", "MOB", &client),
            ("client", "tablet", "TAB", &client),
            ("client", "browser", "WEB", &client),
            ("container", "docker", "DKR", &container),
            ("container", "pod", "POD", &container),
            ("container", "deployment", "DEP", &container),
            ("container", "service", "SVC", &container),
            ("container", "ingress", "ING", &container),
            ("workflow", "pipeline", "CI", &workflow),
            ("workflow", "vcs", "GIT", &workflow),
            ("generic", "rack", "RCK", &generic),
            ("generic", "storage", "STO", &generic),
            ("generic", "device", "DEV", &generic),
        ] {
            builder = builder.register(category, name, Glyph::new(badge, color.clone()));
        }
        builder.build()
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_succeeds() {
        let registry = SymbolRegistry::builtin();
        let glyph = registry.lookup("compute", "server").unwrap();
        assert_eq!(glyph.badge(), "SRV");
    }

    #[test]
    fn unknown_pair_is_hard_error() {
        let registry = SymbolRegistry::builtin();
        let err = registry.lookup("compute", "mainframe").unwrap_err();
        assert_eq!(err.category, "compute");
        assert_eq!(err.name, "mainframe");
        assert_eq!(err.to_string(), "unknown symbol: compute/mainframe");
    }

    #[test]
    fn custom_registration_overrides_builtin() {
        let registry = SymbolRegistry::builder()
            .register(
                "compute",
                "server",
                Glyph::new("BOX", Color::new("teal").unwrap()),
            )
            .build();
        assert_eq!(registry.lookup("compute", "server").unwrap().badge(), "BOX");
        assert!(registry.lookup("network", "vpc").is_err());
    }
}
