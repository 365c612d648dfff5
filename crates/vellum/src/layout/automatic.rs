//! The automatic layout strategy.
//!
//! Each cluster scope is laid out independently in post-order: an inner
//! cluster is resolved first and then participates in its parent scope as a
//! fixed-size super-node. Within a scope, ranks follow edge direction via
//! BFS layering on a local digraph; rank ties break by declaration order so
//! the result is stable across runs.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};
use unicode_width::UnicodeWidthStr;

use vellum_core::{
    geometry::{Bounds, Insets, Point, Size},
    identifier::Id,
};

use crate::{
    layout::{CLUSTER_LABEL_STRIP, CLUSTER_MARGIN, PositionedDiagram},
    model::{ChildRef, Diagram, Node, Orientation},
};

// Fixed text metrics: labels render at a known font size, so a per-column
// advance is enough to size boxes without shaping.
const CHAR_ADVANCE: f32 = 8.4;
const LINE_HEIGHT: f32 = 18.0;
const BADGE_STRIP: f32 = 16.0;
const NODE_PADDING_X: f32 = 14.0;
const NODE_PADDING_Y: f32 = 10.0;
const NODE_MIN_WIDTH: f32 = 120.0;
const NODE_MIN_HEIGHT: f32 = 60.0;
const ITEM_SPACING: f32 = 28.0;
const RANK_SPACING: f32 = 56.0;
const EMPTY_CLUSTER_CONTENT: Size = Size::new(48.0, 24.0);

pub(crate) fn resolve(diagram: &Diagram) -> PositionedDiagram {
    let mut engine = Engine {
        diagram,
        parents: diagram.parent_map(),
        sizes: HashMap::new(),
        relative: HashMap::new(),
        content_origins: HashMap::new(),
    };

    engine.layout_cluster(diagram.root());

    let mut bounds = IndexMap::new();
    engine.place(diagram.root(), Point::default(), &mut bounds);
    PositionedDiagram::new(bounds)
}

struct Engine<'a> {
    diagram: &'a Diagram,
    parents: HashMap<Id, Id>,
    /// Resolved outer size per cluster.
    sizes: HashMap<Id, Size>,
    /// Child bounds relative to the parent's content origin.
    relative: HashMap<Id, Bounds>,
    /// Offset from a cluster's top-left corner to its content area.
    content_origins: HashMap<Id, Point>,
}

impl Engine<'_> {
    /// Lays out one cluster scope and returns the cluster's outer size.
    fn layout_cluster(&mut self, cluster_id: Id) -> Size {
        let children: Vec<ChildRef> = self
            .diagram
            .cluster(cluster_id)
            .expect("cluster ids in the tree are always resolvable")
            .children()
            .to_vec();

        let mut child_sizes: Vec<(Id, Size)> = Vec::with_capacity(children.len());
        for child in &children {
            let size = match child {
                ChildRef::Node(id) => node_size(
                    self.diagram
                        .node(*id)
                        .expect("child node ids are always resolvable"),
                ),
                ChildRef::Cluster(id) => self.layout_cluster(*id),
            };
            child_sizes.push((child.id(), size));
        }

        let content = self.place_children(cluster_id, &child_sizes);

        let cluster = self
            .diagram
            .cluster(cluster_id)
            .expect("cluster ids in the tree are always resolvable");
        let margin = scope_margin(cluster.label().is_some());
        self.content_origins
            .insert(cluster_id, Point::new(margin.left(), margin.top()));

        let size = content.add_insets(margin);
        debug!(
            cluster = cluster_id.resolve(),
            children = children.len(),
            width = size.width(),
            height = size.height();
            "Cluster scope resolved",
        );
        self.sizes.insert(cluster_id, size);
        size
    }

    /// Positions the children of one scope, recording their bounds relative
    /// to the scope's content origin, and returns the content size.
    fn place_children(&mut self, cluster_id: Id, child_sizes: &[(Id, Size)]) -> Size {
        if child_sizes.is_empty() {
            return EMPTY_CLUSTER_CONTENT;
        }

        let sizes: HashMap<Id, Size> = child_sizes.iter().copied().collect();
        let decl_index: HashMap<Id, usize> = child_sizes
            .iter()
            .enumerate()
            .map(|(index, (id, _))| (*id, index))
            .collect();

        let graph = self.scope_graph(cluster_id, child_sizes);
        let ranks = assign_ranks(&graph, &decl_index);

        // Rank extent along the flow axis and packed breadth across it.
        let orientation = self.diagram.orientation();
        let rank_extents: Vec<f32> = ranks
            .iter()
            .map(|rank| {
                rank.iter()
                    .map(|&idx| flow_extent(sizes[&graph[idx]], orientation))
                    .fold(0.0, f32::max)
            })
            .collect();
        let rank_breadths: Vec<f32> = ranks
            .iter()
            .map(|rank| {
                let total: f32 = rank
                    .iter()
                    .map(|&idx| cross_extent(sizes[&graph[idx]], orientation))
                    .sum();
                total + ITEM_SPACING * (rank.len().saturating_sub(1)) as f32
            })
            .collect();
        let content_breadth = rank_breadths.iter().copied().fold(0.0, f32::max);

        let mut along = 0.0;
        for (rank_index, rank) in ranks.iter().enumerate() {
            // Center the rank across the widest one.
            let mut across = (content_breadth - rank_breadths[rank_index]) / 2.0;
            for &idx in rank {
                let id = graph[idx];
                let size = sizes[&id];
                // Center each member within the rank's flow extent.
                let centered = along + (rank_extents[rank_index] - flow_extent(size, orientation)) / 2.0;
                let origin = match orientation {
                    Orientation::TopToBottom => Point::new(across, centered),
                    Orientation::LeftToRight => Point::new(centered, across),
                };
                self.relative
                    .insert(id, Bounds::from_origin_size(origin, size));
                across += cross_extent(size, orientation) + ITEM_SPACING;
            }
            along += rank_extents[rank_index] + RANK_SPACING;
        }

        let content_along = along - RANK_SPACING;
        match orientation {
            Orientation::TopToBottom => Size::new(content_breadth, content_along),
            Orientation::LeftToRight => Size::new(content_along, content_breadth),
        }
    }

    /// Builds the local digraph for one scope. Diagram edges are projected
    /// onto the ancestor of each endpoint that is a direct child of the
    /// scope; edges that stay inside one child or leave the scope entirely
    /// are dropped here and handled by the scope they belong to.
    fn scope_graph(&self, cluster_id: Id, child_sizes: &[(Id, Size)]) -> DiGraph<Id, ()> {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for (id, _) in child_sizes {
            indices.insert(*id, graph.add_node(*id));
        }

        let mut seen = HashSet::new();
        for edge in self.diagram.edges() {
            let (Some(source), Some(target)) = (
                self.project(edge.source(), cluster_id),
                self.project(edge.target(), cluster_id),
            ) else {
                continue;
            };
            if source != target && seen.insert((source, target)) {
                graph.add_edge(indices[&source], indices[&target], ());
            }
        }
        graph
    }

    /// Walks `id` up the containment tree to the ancestor that is a direct
    /// child of `scope`, or `None` when `id` is not inside `scope`.
    fn project(&self, id: Id, scope: Id) -> Option<Id> {
        let mut current = id;
        loop {
            match self.parents.get(&current) {
                Some(&parent) if parent == scope => return Some(current),
                Some(&parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Converts relative bounds into absolute ones, walking parents first.
    fn place(&self, cluster_id: Id, origin: Point, out: &mut IndexMap<Id, Bounds>) {
        let size = self.sizes[&cluster_id];
        out.insert(cluster_id, Bounds::from_origin_size(origin, size));

        let content_origin = origin.add_point(self.content_origins[&cluster_id]);
        let cluster = self
            .diagram
            .cluster(cluster_id)
            .expect("cluster ids in the tree are always resolvable");
        for child in cluster.children() {
            let relative = self.relative[&child.id()];
            let child_origin = content_origin.add_point(relative.origin());
            match child {
                ChildRef::Node(id) => {
                    out.insert(
                        *id,
                        Bounds::from_origin_size(child_origin, relative.to_size()),
                    );
                }
                ChildRef::Cluster(id) => self.place(*id, child_origin, out),
            }
        }
    }
}

fn scope_margin(labeled: bool) -> Insets {
    let margin = Insets::uniform(CLUSTER_MARGIN);
    if labeled {
        margin.with_top(CLUSTER_MARGIN + CLUSTER_LABEL_STRIP)
    } else {
        margin
    }
}

/// Sizes a node box from its label lines using the fixed text metrics.
fn node_size(node: &Node) -> Size {
    let mut text_width = 0.0f32;
    let mut line_count = 0usize;
    for line in node.label_lines() {
        text_width = text_width.max(line.width() as f32 * CHAR_ADVANCE);
        line_count += 1;
    }

    let width = (text_width + 2.0 * NODE_PADDING_X).max(NODE_MIN_WIDTH);
    let height = (BADGE_STRIP + line_count as f32 * LINE_HEIGHT + 2.0 * NODE_PADDING_Y)
        .max(NODE_MIN_HEIGHT);
    Size::new(width, height)
}

fn flow_extent(size: Size, orientation: Orientation) -> f32 {
    match orientation {
        Orientation::TopToBottom => size.height(),
        Orientation::LeftToRight => size.width(),
    }
}

fn cross_extent(size: Size, orientation: Orientation) -> f32 {
    match orientation {
        Orientation::TopToBottom => size.width(),
        Orientation::LeftToRight => size.height(),
    }
}

/// BFS layering over the scope graph.
///
/// Roots are the in-degree-zero members in declaration order; members only
/// reachable through a cycle seed at rank zero when the queue runs dry, so
/// every member gets a rank. Neighbors push in declaration order, which makes
/// rank membership order deterministic.
fn assign_ranks(graph: &DiGraph<Id, ()>, decl_index: &HashMap<Id, usize>) -> Vec<Vec<NodeIndex>> {
    let mut members: Vec<NodeIndex> = graph.node_indices().collect();
    members.sort_by_key(|&idx| decl_index[&graph[idx]]);

    let mut queue: VecDeque<(NodeIndex, usize)> = members
        .iter()
        .copied()
        .filter(|&idx| {
            graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
        .map(|idx| (idx, 0))
        .collect();

    let mut ranks: Vec<Vec<NodeIndex>> = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = members.into_iter();

    loop {
        let Some((idx, rank)) = queue.pop_front() else {
            // Cycle-only components have no in-degree-zero entry point.
            match pending.find(|idx| !visited.contains(idx)) {
                Some(idx) => {
                    queue.push_back((idx, 0));
                    continue;
                }
                None => break,
            }
        };
        if !visited.insert(idx) {
            continue;
        }
        while ranks.len() <= rank {
            ranks.push(Vec::new());
        }
        ranks[rank].push(idx);

        let mut next: Vec<NodeIndex> = graph.neighbors(idx).collect();
        next.sort_by_key(|&n| decl_index[&graph[n]]);
        for neighbor in next {
            if !visited.contains(&neighbor) {
                queue.push_back((neighbor, rank + 1));
            }
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DiagramBuilder;
    use crate::model::EdgeStyle;

    fn chain_diagram() -> Diagram {
        let mut builder = DiagramBuilder::new("chain");
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "compute", "server", "B").unwrap();
        let c = builder.node("c", "compute", "server", "C").unwrap();
        builder.connect(&[a], &[b], EdgeStyle::new()).unwrap();
        builder.connect(&[b], &[c], EdgeStyle::new()).unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn chain_ranks_advance_along_the_flow_axis() {
        let diagram = chain_diagram();
        let positioned = resolve(&diagram);

        let a = positioned.bounds_of(Id::new("a")).unwrap();
        let b = positioned.bounds_of(Id::new("b")).unwrap();
        let c = positioned.bounds_of(Id::new("c")).unwrap();
        assert!(a.max_y() < b.min_y());
        assert!(b.max_y() < c.min_y());
    }

    #[test]
    fn left_to_right_swaps_the_rank_axis() {
        let mut builder = DiagramBuilder::new("lr").with_orientation(Orientation::LeftToRight);
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "compute", "server", "B").unwrap();
        builder.edge(a, b).unwrap();
        let positioned = resolve(&builder.finish().unwrap());

        let a = positioned.bounds_of(Id::new("a")).unwrap();
        let b = positioned.bounds_of(Id::new("b")).unwrap();
        assert!(a.max_x() < b.min_x());
    }

    #[test]
    fn rank_ties_break_by_declaration_order() {
        let mut builder = DiagramBuilder::new("fanout");
        let src = builder.node("src", "compute", "server", "S").unwrap();
        let first = builder.node("first", "compute", "server", "1").unwrap();
        let second = builder.node("second", "compute", "server", "2").unwrap();
        builder
            .connect(&[src], &[second, first], EdgeStyle::new())
            .unwrap();
        let positioned = resolve(&builder.finish().unwrap());

        // Declaration order wins over edge order: "first" sits left of
        // "second" even though the edge to "second" was declared first.
        let first = positioned.bounds_of(Id::new("first")).unwrap();
        let second = positioned.bounds_of(Id::new("second")).unwrap();
        assert!(first.min_x() < second.min_x());
    }

    #[test]
    fn cycles_still_place_every_node() {
        let mut builder = DiagramBuilder::new("cycle");
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "compute", "server", "B").unwrap();
        builder.edge(a, b).unwrap();
        builder.edge(b, a).unwrap();
        let diagram = builder.finish().unwrap();
        let positioned = resolve(&diagram);

        assert!(positioned.bounds_of(a).is_some());
        assert!(positioned.bounds_of(b).is_some());
    }

    #[test]
    fn cluster_bounds_contain_children_with_margin() {
        let mut builder = DiagramBuilder::new("nested");
        builder
            .cluster("outer", "Outer", |b| {
                b.node("inner", "compute", "server", "Inner")?;
                Ok(())
            })
            .unwrap();
        let positioned = resolve(&builder.finish().unwrap());

        let outer = positioned.bounds_of(Id::new("outer")).unwrap();
        let inner = positioned.bounds_of(Id::new("inner")).unwrap();
        assert!(outer.contains(inner));
        assert!(inner.min_x() - outer.min_x() >= CLUSTER_MARGIN - 1e-3);
        // Labeled clusters reserve extra room at the top.
        assert!(inner.min_y() - outer.min_y() >= CLUSTER_MARGIN + CLUSTER_LABEL_STRIP - 1e-3);
    }

    #[test]
    fn cross_cluster_edge_ranks_the_clusters() {
        let mut builder = DiagramBuilder::new("projected");
        let mut web = None;
        builder
            .cluster("front", "Frontend", |b| {
                web = Some(b.node("web", "client", "browser", "Web")?);
                Ok(())
            })
            .unwrap();
        let mut api = None;
        builder
            .cluster("back", "Backend", |b| {
                api = Some(b.node("api", "compute", "server", "API")?);
                Ok(())
            })
            .unwrap();
        builder.edge(web.unwrap(), api.unwrap()).unwrap();
        let positioned = resolve(&builder.finish().unwrap());

        // The node-to-node edge projects onto the two sibling clusters.
        let front = positioned.bounds_of(Id::new("front")).unwrap();
        let back = positioned.bounds_of(Id::new("back")).unwrap();
        assert!(front.max_y() < back.min_y());
    }

    #[test]
    fn resolving_twice_is_identical() {
        let diagram = chain_diagram();
        let first = resolve(&diagram);
        let second = resolve(&diagram);
        for (id, bounds) in first.iter() {
            assert_eq!(second.bounds_of(id), Some(bounds));
        }
    }

    #[test]
    fn multiline_labels_grow_the_node_box() {
        let mut builder = DiagramBuilder::new("lines");
        builder
            .node("one", "compute", "server", "single")
            .unwrap();
        builder
            .node("three", "compute", "server", "one\ntwo\nthree")
            .unwrap();
        let diagram = builder.finish().unwrap();

        let one = node_size(diagram.node(Id::new("one")).unwrap());
        let three = node_size(diagram.node(Id::new("three")).unwrap());
        assert!(three.height() > one.height());
    }
}
