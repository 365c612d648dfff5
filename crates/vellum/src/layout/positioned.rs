use indexmap::IndexMap;

use vellum_core::{geometry::Bounds, identifier::Id};

/// The result of layout resolution: absolute bounds for every node and
/// cluster, in canvas units with the origin at the top-left.
#[derive(Debug, Clone)]
pub struct PositionedDiagram {
    bounds: IndexMap<Id, Bounds>,
    canvas: Bounds,
}

impl PositionedDiagram {
    pub(crate) fn new(bounds: IndexMap<Id, Bounds>) -> Self {
        let canvas = bounds
            .values()
            .copied()
            .reduce(Bounds::merge)
            .unwrap_or_default();
        Self { bounds, canvas }
    }

    /// Returns the resolved bounds of a node or cluster.
    pub fn bounds_of(&self, id: Id) -> Option<Bounds> {
        self.bounds.get(&id).copied()
    }

    /// The bounding box of every element together.
    pub fn canvas(&self) -> Bounds {
        self.canvas
    }

    /// Iterates resolved elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, Bounds)> + '_ {
        self.bounds.iter().map(|(id, bounds)| (*id, *bounds))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}
