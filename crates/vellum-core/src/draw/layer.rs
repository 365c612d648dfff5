//! Layer-tagged draw command collection.
//!
//! A [`Scene`] collects [`DrawCommand`]s tagged with a [`RenderLayer`] and
//! hands them to backends sorted bottom-to-top, giving deterministic
//! z-ordering: clusters render before the nodes they contain, nodes before
//! the edges that touch them, labels above everything.

use crate::{draw::DrawCommand, geometry::Size};

/// Z-order layers, rendered from bottom to top in declaration order.
///
/// The `Ord` derive uses variant declaration order, so the first variant
/// renders first (bottom) and the last renders last (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Canvas background fill.
    Background,
    /// Cluster bounding boxes, outermost first.
    Cluster,
    /// Node boxes.
    Node,
    /// Connector lines between elements.
    Edge,
    /// Node, cluster, and edge labels.
    Label,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Cluster => "cluster",
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Label => "label",
        }
    }
}

/// A canvas size plus draw commands grouped by rendering layer.
#[derive(Debug, Default)]
pub struct Scene {
    size: Size,
    items: Vec<(RenderLayer, DrawCommand)>,
}

impl Scene {
    /// Creates an empty scene with the given canvas size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }

    /// The canvas size in layout units (unscaled).
    pub fn size(&self) -> Size {
        self.size
    }

    /// Adds a command to the specified layer.
    ///
    /// Commands within one layer keep the order they were pushed in.
    pub fn push(&mut self, layer: RenderLayer, command: DrawCommand) {
        self.items.push((layer, command));
    }

    /// Appends all commands from another scene into this one.
    pub fn merge(&mut self, other: Scene) {
        self.items.extend(other.items);
    }

    /// Returns `true` if no commands have been pushed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the scene, yielding commands in z-order.
    ///
    /// A stable sort on the layer tag keeps insertion order within each
    /// layer.
    pub fn into_commands(mut self) -> Vec<(RenderLayer, DrawCommand)> {
        self.items.sort_by_key(|(layer, _)| *layer);
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{draw::StrokeDefinition, geometry::Point};

    fn connector() -> DrawCommand {
        DrawCommand::Connector {
            from: Point::new(0.0, 0.0),
            to: Point::new(10.0, 0.0),
            stroke: StrokeDefinition::default(),
            arrowhead: true,
        }
    }

    #[test]
    fn commands_sort_by_layer() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        scene.push(RenderLayer::Edge, connector());
        scene.push(RenderLayer::Background, connector());
        scene.push(RenderLayer::Node, connector());

        let layers: Vec<_> = scene
            .into_commands()
            .into_iter()
            .map(|(layer, _)| layer)
            .collect();
        assert_eq!(
            layers,
            vec![RenderLayer::Background, RenderLayer::Node, RenderLayer::Edge]
        );
    }

    #[test]
    fn insertion_order_kept_within_layer() {
        let mut scene = Scene::new(Size::default());
        scene.push(
            RenderLayer::Node,
            DrawCommand::Text {
                anchor: Point::new(1.0, 0.0),
                lines: vec!["first".into()],
                font_size: 12.0,
                color: Default::default(),
                text_anchor: Default::default(),
            },
        );
        scene.push(
            RenderLayer::Node,
            DrawCommand::Text {
                anchor: Point::new(2.0, 0.0),
                lines: vec!["second".into()],
                font_size: 12.0,
                color: Default::default(),
                text_anchor: Default::default(),
            },
        );

        let commands = scene.into_commands();
        match (&commands[0].1, &commands[1].1) {
            (DrawCommand::Text { lines: a, .. }, DrawCommand::Text { lines: b, .. }) => {
                assert_eq!(a[0], "first");
                assert_eq!(b[0], "second");
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn merge_combines_scenes() {
        let mut a = Scene::new(Size::default());
        a.push(RenderLayer::Cluster, connector());
        let mut b = Scene::new(Size::default());
        b.push(RenderLayer::Label, connector());

        a.merge(b);
        assert_eq!(a.into_commands().len(), 2);
    }
}
