//! The fluent builder used to assemble a [`Diagram`].
//!
//! Cluster scoping uses an explicit stack of "current cluster" references:
//! [`DiagramBuilder::cluster`] pushes a context, runs the caller's closure,
//! and pops unconditionally — the previous context is restored even when
//! construction inside the scope fails. This mirrors the two-phase pattern
//! the model expects: declare all nodes and clusters first, then declare
//! edges in a later connections phase.

use indexmap::IndexMap;
use log::{debug, info};

use vellum_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    symbol::SymbolRegistry,
};

use crate::model::{
    ChildRef, Cluster, Diagram, Edge, EdgeStyle, LayoutMode, ModelError, Node, Orientation,
    slugify,
};

/// Builder for a single [`Diagram`].
///
/// # Examples
///
/// ```
/// use vellum::builder::DiagramBuilder;
/// use vellum::model::EdgeStyle;
///
/// let mut builder = DiagramBuilder::new("Request Path");
/// let lb = builder.node("lb", "network", "load-balancer", "ALB")?;
/// let (mut api, mut db) = (None, None);
/// builder.cluster("app", "Application", |b| {
///     api = Some(b.node("api", "compute", "server", "API Server")?);
///     db = Some(b.node("db", "database", "relational", "PostgreSQL")?);
///     Ok(())
/// })?;
/// builder.edge(lb, api.unwrap())?;
/// builder.connect(&[api.unwrap()], &[db.unwrap()], EdgeStyle::new().label("SQL"))?;
/// let diagram = builder.finish()?;
/// assert_eq!(diagram.edges().len(), 2);
/// # Ok::<(), vellum::model::ModelError>(())
/// ```
pub struct DiagramBuilder {
    registry: SymbolRegistry,
    title: String,
    slug: String,
    orientation: Orientation,
    background: Option<Color>,
    root: Id,
    nodes: IndexMap<Id, Node>,
    clusters: IndexMap<Id, Cluster>,
    edges: Vec<Edge>,
    stack: Vec<Id>,
}

impl DiagramBuilder {
    /// Creates a builder for a diagram with the given title.
    ///
    /// The implicit root cluster is created immediately; its id is derived
    /// from the title slug so it cannot collide with caller-chosen ids.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        let root = Id::new(&format!("{slug}::root"));

        let mut clusters = IndexMap::new();
        clusters.insert(
            root,
            Cluster {
                id: root,
                label: None,
                fill: None,
                children: Vec::new(),
                placement: None,
            },
        );

        Self {
            registry: SymbolRegistry::builtin(),
            title,
            slug,
            orientation: Orientation::default(),
            background: None,
            root,
            nodes: IndexMap::new(),
            clusters,
            edges: Vec::new(),
            stack: vec![root],
        }
    }

    /// Replaces the built-in symbol registry.
    pub fn with_registry(mut self, registry: SymbolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the rank direction used by the automatic layout strategy.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the canvas background color.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    /// Adds a node to the current cluster context.
    ///
    /// The glyph for `(category, name)` is resolved immediately, so an
    /// unregistered symbol fails here rather than at render time.
    pub fn node(
        &mut self,
        id: &str,
        category: &str,
        name: &str,
        label: impl Into<String>,
    ) -> Result<Id, ModelError> {
        self.insert_node(id, category, name, label.into(), None)
    }

    /// Adds a node with an explicit box for manual placement.
    ///
    /// `origin` is the top-left corner of the node box.
    pub fn placed_node(
        &mut self,
        id: &str,
        category: &str,
        name: &str,
        label: impl Into<String>,
        origin: Point,
        size: Size,
    ) -> Result<Id, ModelError> {
        self.insert_node(
            id,
            category,
            name,
            label.into(),
            Some(Bounds::from_origin_size(origin, size)),
        )
    }

    /// Opens a cluster scope, runs `build` inside it, and closes the scope.
    ///
    /// Everything created inside `build` becomes a child of this cluster.
    /// The previous context is restored unconditionally, including when
    /// `build` returns an error.
    pub fn cluster<F>(&mut self, id: &str, label: &str, build: F) -> Result<Id, ModelError>
    where
        F: FnOnce(&mut Self) -> Result<(), ModelError>,
    {
        self.scoped_cluster(id, Some(label.to_string()), None, None, build)
    }

    /// Like [`cluster`](Self::cluster) with a background fill color.
    pub fn tinted_cluster<F>(
        &mut self,
        id: &str,
        label: &str,
        fill: Color,
        build: F,
    ) -> Result<Id, ModelError>
    where
        F: FnOnce(&mut Self) -> Result<(), ModelError>,
    {
        self.scoped_cluster(id, Some(label.to_string()), Some(fill), None, build)
    }

    /// Like [`cluster`](Self::cluster) with an explicit bounding box for
    /// manual placement.
    pub fn placed_cluster<F>(
        &mut self,
        id: &str,
        label: &str,
        bounds: Bounds,
        build: F,
    ) -> Result<Id, ModelError>
    where
        F: FnOnce(&mut Self) -> Result<(), ModelError>,
    {
        self.scoped_cluster(id, Some(label.to_string()), None, Some(bounds), build)
    }

    /// Appends one edge from `source` to `target` with default style.
    pub fn edge(&mut self, source: Id, target: Id) -> Result<(), ModelError> {
        self.connect(&[source], &[target], EdgeStyle::new())
    }

    /// Appends one edge per `(source × target)` pair.
    ///
    /// Edges are emitted in source-major, left-to-right order, which keeps
    /// rendering deterministic. Every endpoint must already exist somewhere
    /// in the diagram; cross-cluster references are fine.
    pub fn connect(
        &mut self,
        sources: &[Id],
        targets: &[Id],
        style: EdgeStyle,
    ) -> Result<(), ModelError> {
        // Validate all endpoints up front so a failure appends nothing.
        for &id in sources.iter().chain(targets) {
            if !self.contains_id(id) {
                return Err(ModelError::DanglingEdge { id: id.resolve() });
            }
        }

        for &source in sources {
            for &target in targets {
                self.edges.push(Edge {
                    source,
                    target,
                    label: style.label.clone(),
                    stroke: style.stroke.clone(),
                });
            }
        }
        Ok(())
    }

    /// Seals the diagram, deciding its layout mode.
    ///
    /// Fails with [`ModelError::InconsistentLayoutMode`] when some elements
    /// carry explicit boxes and others do not.
    pub fn finish(self) -> Result<Diagram, ModelError> {
        let placeable = self.nodes.len() + self.clusters.len() - 1;
        let explicit = self
            .nodes
            .values()
            .filter(|node| node.placement.is_some())
            .count()
            + self
                .clusters
                .values()
                .filter(|cluster| cluster.id != self.root && cluster.placement.is_some())
                .count();

        let layout_mode = if explicit == 0 {
            LayoutMode::Automatic
        } else if explicit == placeable {
            LayoutMode::Manual
        } else {
            return Err(ModelError::InconsistentLayoutMode);
        };

        info!(
            title = self.title,
            nodes = self.nodes.len(),
            clusters = self.clusters.len() - 1,
            edges = self.edges.len(),
            layout_mode:? = layout_mode;
            "Diagram sealed",
        );

        Ok(Diagram {
            title: self.title,
            slug: self.slug,
            orientation: self.orientation,
            background: self.background,
            root: self.root,
            nodes: self.nodes,
            clusters: self.clusters,
            edges: self.edges,
            layout_mode,
        })
    }

    fn contains_id(&self, id: Id) -> bool {
        self.nodes.contains_key(&id) || self.clusters.contains_key(&id)
    }

    fn ensure_unique(&self, id: Id) -> Result<(), ModelError> {
        if self.contains_id(id) {
            return Err(ModelError::DuplicateId { id: id.resolve() });
        }
        Ok(())
    }

    fn current_cluster(&mut self) -> &mut Cluster {
        let current = *self.stack.last().expect("the root context is never popped");
        self.clusters
            .get_mut(&current)
            .expect("stack entries always name live clusters")
    }

    fn insert_node(
        &mut self,
        id: &str,
        category: &str,
        name: &str,
        label: String,
        placement: Option<Bounds>,
    ) -> Result<Id, ModelError> {
        let id = Id::new(id);
        self.ensure_unique(id)?;
        let glyph = self.registry.lookup(category, name)?.clone();

        debug!(id = id.resolve(), category, name; "Node added");
        self.nodes.insert(
            id,
            Node {
                id,
                label,
                glyph,
                placement,
            },
        );
        self.current_cluster().children.push(ChildRef::Node(id));
        Ok(id)
    }

    fn scoped_cluster<F>(
        &mut self,
        id: &str,
        label: Option<String>,
        fill: Option<Color>,
        placement: Option<Bounds>,
        build: F,
    ) -> Result<Id, ModelError>
    where
        F: FnOnce(&mut Self) -> Result<(), ModelError>,
    {
        let id = Id::new(id);
        self.ensure_unique(id)?;

        debug!(id = id.resolve(); "Cluster opened");
        self.clusters.insert(
            id,
            Cluster {
                id,
                label,
                fill,
                children: Vec::new(),
                placement,
            },
        );
        self.current_cluster().children.push(ChildRef::Cluster(id));

        self.stack.push(id);
        let result = build(self);
        // Scope exit is unconditional cleanup: restore the previous context
        // whether or not the closure succeeded.
        self.stack.pop();

        result.map(|()| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes(builder: &mut DiagramBuilder) -> (Id, Id) {
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "compute", "server", "B").unwrap();
        (a, b)
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut builder = DiagramBuilder::new("t");
        builder.node("api", "compute", "server", "API").unwrap();
        let err = builder.node("api", "compute", "server", "API 2").unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { id } if id == "api"));
    }

    #[test]
    fn node_and_cluster_share_id_space() {
        let mut builder = DiagramBuilder::new("t");
        builder.node("shared", "compute", "server", "N").unwrap();
        let err = builder.cluster("shared", "C", |_| Ok(())).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { .. }));
    }

    #[test]
    fn unknown_symbol_fails_at_node_creation() {
        let mut builder = DiagramBuilder::new("t");
        let err = builder
            .node("x", "compute", "quantum-annealer", "X")
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownSymbol(_)));
    }

    #[test]
    fn dangling_edge_rejected() {
        let mut builder = DiagramBuilder::new("t");
        let (a, _) = two_nodes(&mut builder);
        let ghost = Id::new("ghost");
        let err = builder.edge(a, ghost).unwrap_err();
        assert!(matches!(err, ModelError::DanglingEdge { id } if id == "ghost"));
    }

    #[test]
    fn failed_connect_appends_nothing() {
        let mut builder = DiagramBuilder::new("t");
        let (a, b) = two_nodes(&mut builder);
        let ghost = Id::new("ghost2");
        assert!(builder.connect(&[a, b], &[ghost], EdgeStyle::new()).is_err());
        let diagram = builder.finish().unwrap();
        assert!(diagram.edges().is_empty());
    }

    #[test]
    fn cartesian_connect_is_source_major() {
        let mut builder = DiagramBuilder::new("t");
        let s1 = builder.node("s1", "compute", "server", "s1").unwrap();
        let s2 = builder.node("s2", "compute", "server", "s2").unwrap();
        let d1 = builder.node("d1", "compute", "server", "d1").unwrap();
        let d2 = builder.node("d2", "compute", "server", "d2").unwrap();
        let d3 = builder.node("d3", "compute", "server", "d3").unwrap();

        builder
            .connect(&[s1, s2], &[d1, d2, d3], EdgeStyle::new())
            .unwrap();
        let diagram = builder.finish().unwrap();

        let pairs: Vec<_> = diagram
            .edges()
            .iter()
            .map(|e| (e.source().resolve(), e.target().resolve()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("s1", "d1"),
                ("s1", "d2"),
                ("s1", "d3"),
                ("s2", "d1"),
                ("s2", "d2"),
                ("s2", "d3"),
            ]
            .map(|(s, d)| (s.to_string(), d.to_string()))
        );
    }

    #[test]
    fn cluster_scope_restored_after_error() {
        let mut builder = DiagramBuilder::new("t");
        let result = builder.cluster("broken", "Broken", |b| {
            b.node("inner", "compute", "server", "ok")?;
            // An unknown symbol aborts the scope midway.
            b.node("bad", "compute", "nope", "bad")?;
            Ok(())
        });
        assert!(result.is_err());

        // The context is back at the root: new nodes land there, not in
        // the failed cluster.
        let after = builder.node("after", "compute", "server", "after").unwrap();
        let diagram = builder.finish().unwrap();
        let root_children: Vec<_> = diagram
            .cluster(diagram.root())
            .unwrap()
            .children()
            .iter()
            .map(|c| c.id())
            .collect();
        assert!(root_children.contains(&after));
    }

    #[test]
    fn nested_clusters_record_declaration_order() {
        let mut builder = DiagramBuilder::new("t");
        builder
            .cluster("outer", "Outer", |b| {
                b.node("first", "compute", "server", "1")?;
                b.cluster("inner", "Inner", |b| {
                    b.node("deep", "compute", "server", "deep")?;
                    Ok(())
                })?;
                b.node("second", "compute", "server", "2")?;
                Ok(())
            })
            .unwrap();
        let diagram = builder.finish().unwrap();

        let outer = diagram.cluster(Id::new("outer")).unwrap();
        let kinds: Vec<_> = outer
            .children()
            .iter()
            .map(|c| c.id().resolve())
            .collect();
        assert_eq!(kinds, ["first", "inner", "second"]);

        let parents = diagram.parent_map();
        assert_eq!(parents[&Id::new("deep")], Id::new("inner"));
        assert_eq!(parents[&Id::new("inner")], Id::new("outer"));
    }

    #[test]
    fn cross_cluster_edges_are_valid() {
        let mut builder = DiagramBuilder::new("t");
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

        // Edge between nodes in sibling clusters, and to a cluster boundary.
        builder.edge(web.unwrap(), api.unwrap()).unwrap();
        builder.edge(web.unwrap(), Id::new("back")).unwrap();
        assert_eq!(builder.finish().unwrap().edges().len(), 2);
    }

    #[test]
    fn mixed_placement_is_rejected() {
        let mut builder = DiagramBuilder::new("t");
        builder
            .placed_node(
                "a",
                "compute",
                "server",
                "A",
                Point::new(0.0, 0.0),
                Size::new(100.0, 60.0),
            )
            .unwrap();
        builder.node("b", "compute", "server", "B").unwrap();
        assert!(matches!(
            builder.finish().unwrap_err(),
            ModelError::InconsistentLayoutMode
        ));
    }

    #[test]
    fn all_automatic_and_all_manual_both_seal() {
        let mut auto = DiagramBuilder::new("auto");
        two_nodes(&mut auto);
        assert_eq!(auto.finish().unwrap().layout_mode(), LayoutMode::Automatic);

        let mut manual = DiagramBuilder::new("manual");
        manual
            .placed_node(
                "a",
                "compute",
                "server",
                "A",
                Point::new(0.0, 0.0),
                Size::new(100.0, 60.0),
            )
            .unwrap();
        assert_eq!(manual.finish().unwrap().layout_mode(), LayoutMode::Manual);
    }
}
