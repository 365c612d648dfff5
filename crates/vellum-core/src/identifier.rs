//! String-interned identifiers for diagram entities.
//!
//! Nodes and clusters are referenced by [`Id`], a cheap `Copy` handle backed
//! by a process-global string interner. Two ids created from the same string
//! are equal, which is what edge endpoint resolution relies on, and a handle
//! resolves on any thread, so a diagram built on a worker thread can be
//! rendered or logged elsewhere.

use std::fmt;
use std::sync::{Mutex, OnceLock};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner. Entries are only ever added, never removed, so a
/// symbol stays resolvable for the life of the process.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> &'static Mutex<DefaultStringInterner> {
    INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()))
}

/// An interned identifier for a node or cluster.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns the given string and returns its handle.
    pub fn new(name: &str) -> Self {
        let mut interner = interner()
            .lock()
            .expect("failed to acquire interner lock");
        Self(interner.get_or_intern(name))
    }

    /// Resolves the id back to its original string.
    pub fn resolve(self) -> String {
        let interner = interner()
            .lock()
            .expect("failed to acquire interner lock");
        interner
            .resolve(self.0)
            .expect("interned symbols are never removed")
            .to_string()
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_id() {
        assert_eq!(Id::new("gateway"), Id::new("gateway"));
    }

    #[test]
    fn different_strings_differ() {
        assert_ne!(Id::new("gateway"), Id::new("ingress"));
    }

    #[test]
    fn resolve_round_trips() {
        let id = Id::new("load-balancer");
        assert_eq!(id.resolve(), "load-balancer");
        assert_eq!(id.to_string(), "load-balancer");
    }

    #[test]
    fn ids_resolve_across_threads() {
        let id = std::thread::spawn(|| Id::new("spawned-elsewhere"))
            .join()
            .unwrap();
        assert_eq!(id.resolve(), "spawned-elsewhere");
        assert_eq!(id, Id::new("spawned-elsewhere"));
    }
}
