//! The format-agnostic diagram model.
//!
//! A [`Diagram`] is a single root cluster of nodes and nested clusters plus
//! an append-only edge list. It is purely descriptive: cycles are legal,
//! edges may connect nodes or cluster boundaries across scopes, and nothing
//! can be removed or moved once added. Construction goes through
//! [`DiagramBuilder`](crate::builder::DiagramBuilder), which enforces the
//! structural invariants and seals the diagram's layout mode.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use vellum_core::{
    color::Color,
    draw::StrokeDefinition,
    geometry::Bounds,
    identifier::Id,
    symbol::{Glyph, UnknownSymbolError},
};

/// Structural errors detected while building a diagram.
///
/// These indicate a malformed description and abort the diagram's pipeline;
/// they are never recoverable within the same run.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate id: {id}")]
    DuplicateId { id: String },

    #[error("edge endpoint references unknown id: {id}")]
    DanglingEdge { id: String },

    #[error("diagram mixes explicit and automatic placement; pick one strategy per diagram")]
    InconsistentLayoutMode,

    #[error(transparent)]
    UnknownSymbol(#[from] UnknownSymbolError),
}

/// Direction of rank progression for the automatic layout strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    TopToBottom,
    LeftToRight,
}

/// How positions are assigned to this diagram's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Ranked placement computed by the layout resolver.
    Automatic,
    /// Every element carries caller-supplied coordinates; the resolver only
    /// validates them.
    Manual,
}

/// An atomic diagram element: one labeled box with a glyph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: Id,
    pub(crate) label: String,
    pub(crate) glyph: Glyph,
    pub(crate) placement: Option<Bounds>,
}

impl Node {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label split on embedded newlines.
    pub fn label_lines(&self) -> impl Iterator<Item = &str> {
        self.label.lines()
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    /// The explicit box for manual placement, if any.
    pub fn placement(&self) -> Option<Bounds> {
        self.placement
    }
}

/// Reference from a cluster to one of its direct children, in declaration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    Node(Id),
    Cluster(Id),
}

impl ChildRef {
    pub fn id(self) -> Id {
        match self {
            Self::Node(id) | Self::Cluster(id) => id,
        }
    }
}

/// A named grouping of nodes and sub-clusters, rendered as a bounding box.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub(crate) id: Id,
    pub(crate) label: Option<String>,
    pub(crate) fill: Option<Color>,
    pub(crate) children: Vec<ChildRef>,
    pub(crate) placement: Option<Bounds>,
}

impl Cluster {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn fill(&self) -> Option<&Color> {
        self.fill.as_ref()
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    pub fn placement(&self) -> Option<Bounds> {
        self.placement
    }
}

/// Label and stroke attributes shared by every edge a `connect` call emits.
#[derive(Debug, Clone, Default)]
pub struct EdgeStyle {
    pub(crate) label: Option<String>,
    pub(crate) stroke: StrokeDefinition,
}

impl EdgeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }
}

/// A directed, optionally labeled connector between two diagram elements.
///
/// Endpoints may be nodes or clusters; a cluster endpoint attaches the
/// connector to the cluster boundary.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) source: Id,
    pub(crate) target: Id,
    pub(crate) label: Option<String>,
    pub(crate) stroke: StrokeDefinition,
}

impl Edge {
    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn stroke(&self) -> &StrokeDefinition {
        &self.stroke
    }
}

/// The root container: a sealed, fully populated diagram ready for layout
/// and rendering.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) orientation: Orientation,
    pub(crate) background: Option<Color>,
    pub(crate) root: Id,
    pub(crate) nodes: IndexMap<Id, Node>,
    pub(crate) clusters: IndexMap<Id, Cluster>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) layout_mode: LayoutMode,
}

impl Diagram {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Filename stem derived from the title.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn background(&self) -> Option<&Color> {
        self.background.as_ref()
    }

    /// Id of the implicit root cluster.
    pub fn root(&self) -> Id {
        self.root
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn cluster(&self, id: Id) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All clusters in declaration order, root first.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// True if the id names a node or cluster of this diagram.
    pub fn contains_id(&self, id: Id) -> bool {
        self.nodes.contains_key(&id) || self.clusters.contains_key(&id)
    }

    /// Maps every node and non-root cluster to its owning cluster.
    pub fn parent_map(&self) -> HashMap<Id, Id> {
        let mut parents = HashMap::new();
        for cluster in self.clusters.values() {
            for child in &cluster.children {
                parents.insert(child.id(), cluster.id);
            }
        }
        parents
    }
}

/// Derives a filename stem from a diagram title.
///
/// Lowercases, collapses runs of non-alphanumeric characters into single
/// hyphens, and trims leading/trailing hyphens.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(
            slugify("Stage 1: AWS Infrastructure Overview"),
            "stage-1-aws-infrastructure-overview"
        );
    }

    #[test]
    fn slugify_trims_edges() {
        assert_eq!(slugify("  (Draft) Pipeline!  "), "draft-pipeline");
    }

    #[test]
    fn slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Übersicht 2"), "übersicht-2");
    }
}
