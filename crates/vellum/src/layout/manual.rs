//! The manual layout strategy.
//!
//! Nothing is computed or corrected here: every element already carries a
//! caller-supplied box, and this pass only checks that the boxes form a
//! consistent picture. Children must fit inside their cluster's content
//! area and siblings must not overlap.

use indexmap::IndexMap;

use vellum_core::geometry::{Bounds, Insets};

use crate::{
    layout::{CLUSTER_LABEL_STRIP, CLUSTER_MARGIN, LayoutError, PositionedDiagram},
    model::{ChildRef, Cluster, Diagram},
};

pub(crate) fn resolve(diagram: &Diagram) -> Result<PositionedDiagram, LayoutError> {
    let mut bounds = IndexMap::new();

    // The root carries no explicit box; it is synthesized around its
    // children, so the containment check only applies to named clusters.
    let root = diagram
        .cluster(diagram.root())
        .expect("the root cluster always exists");
    let root_bounds = synthesized_root_bounds(diagram, root);
    bounds.insert(diagram.root(), root_bounds);

    for cluster in diagram.clusters() {
        let interior = if cluster.id() == diagram.root() {
            None
        } else {
            let outer = placement_of(diagram, ChildRef::Cluster(cluster.id()));
            Some(outer.shrink(content_margin(cluster)))
        };

        for child in cluster.children() {
            let child_bounds = placement_of(diagram, *child);
            if let Some(interior) = interior {
                if !interior.contains(child_bounds) {
                    return Err(LayoutError::OutOfBounds {
                        child: child.id().resolve(),
                        parent: cluster.id().resolve(),
                    });
                }
            }
            bounds.insert(child.id(), child_bounds);
        }

        for (index, first) in cluster.children().iter().enumerate() {
            let first_bounds = placement_of(diagram, *first);
            for second in &cluster.children()[index + 1..] {
                if first_bounds.intersects(placement_of(diagram, *second)) {
                    return Err(LayoutError::Overlap {
                        first: first.id().resolve(),
                        second: second.id().resolve(),
                    });
                }
            }
        }
    }

    Ok(PositionedDiagram::new(bounds))
}

fn content_margin(cluster: &Cluster) -> Insets {
    let margin = Insets::uniform(CLUSTER_MARGIN);
    if cluster.label().is_some() {
        margin.with_top(CLUSTER_MARGIN + CLUSTER_LABEL_STRIP)
    } else {
        margin
    }
}

fn placement_of(diagram: &Diagram, child: ChildRef) -> Bounds {
    let placement = match child {
        ChildRef::Node(id) => diagram
            .node(id)
            .and_then(|node| node.placement()),
        ChildRef::Cluster(id) => diagram
            .cluster(id)
            .and_then(|cluster| cluster.placement()),
    };
    placement.expect("manual diagrams carry a box on every element")
}

fn synthesized_root_bounds(diagram: &Diagram, root: &Cluster) -> Bounds {
    root.children()
        .iter()
        .map(|child| placement_of(diagram, *child))
        .reduce(Bounds::merge)
        .unwrap_or_default()
        .expand(Insets::uniform(CLUSTER_MARGIN))
}
