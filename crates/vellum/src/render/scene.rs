//! Scene construction: positioned diagram in, draw commands out.

use log::debug;
use serde::Deserialize;

use vellum_core::{
    color::Color,
    draw::{DrawCommand, RenderLayer, Scene, StrokeDefinition, TextAnchor},
    geometry::{Bounds, Insets, Point},
    identifier::Id,
};

use crate::{
    layout::PositionedDiagram,
    model::{ChildRef, Diagram},
};

const LINE_HEIGHT: f32 = 18.0;
const BADGE_FONT_SIZE: f32 = 10.0;
const BADGE_BASELINE: f32 = 16.0;
const EDGE_LABEL_OFFSET: f32 = 10.0;

/// Appearance settings for the vector renderer.
///
/// `scale` changes only the output dimensions of the SVG backend; relative
/// layout is unaffected by it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub margin: f32,
    pub font_size: f32,
    pub corner_radius: f32,
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin: 24.0,
            font_size: 14.0,
            corner_radius: 6.0,
            scale: 1.0,
        }
    }
}

/// Builds the draw-command scene for a positioned diagram.
///
/// The canvas is sized to the element bounding box plus the configured
/// margin, and all geometry is shifted so the top-left element sits at the
/// margin. Commands land on their z-layer; the scene sorts them on output.
pub fn build_scene(
    diagram: &Diagram,
    positioned: &PositionedDiagram,
    config: &RenderConfig,
) -> Scene {
    let canvas = positioned.canvas();
    let size = canvas.to_size().add_insets(Insets::uniform(config.margin));
    let offset = Point::new(
        config.margin - canvas.min_x(),
        config.margin - canvas.min_y(),
    );

    let mut scene = Scene::new(size);

    if let Some(background) = diagram.background() {
        scene.push(
            RenderLayer::Background,
            DrawCommand::Rect {
                bounds: Bounds::from_origin_size(Point::default(), size),
                corner_radius: 0.0,
                fill: Some(background.clone()),
                stroke: StrokeDefinition::solid(background.clone(), 0.0),
            },
        );
    }

    push_clusters(diagram, positioned, config, offset, diagram.root(), &mut scene);
    for node in diagram.nodes() {
        if let Some(bounds) = positioned.bounds_of(node.id()) {
            push_node(node, bounds.translate(offset), config, &mut scene);
        }
    }
    push_edges(diagram, positioned, config, offset, &mut scene);

    debug!(
        title = diagram.title(),
        width = size.width(),
        height = size.height();
        "Scene built",
    );
    scene
}

/// Emits cluster frames parents-first so inner frames paint over outer ones.
/// The root cluster is the canvas itself and draws no frame.
fn push_clusters(
    diagram: &Diagram,
    positioned: &PositionedDiagram,
    config: &RenderConfig,
    offset: Point,
    cluster_id: Id,
    scene: &mut Scene,
) {
    if cluster_id != diagram.root() {
        let Some(cluster) = diagram.cluster(cluster_id) else {
            return;
        };
        let Some(bounds) = positioned.bounds_of(cluster_id) else {
            return;
        };
        let bounds = bounds.translate(offset);

        scene.push(
            RenderLayer::Cluster,
            DrawCommand::Rect {
                bounds,
                corner_radius: config.corner_radius,
                fill: cluster.fill().cloned(),
                stroke: StrokeDefinition::dashed(palette("#94a3b8"), 1.0),
            },
        );

        if let Some(label) = cluster.label() {
            scene.push(
                RenderLayer::Label,
                DrawCommand::Text {
                    anchor: Point::new(bounds.min_x() + 10.0, bounds.min_y() + BADGE_BASELINE),
                    lines: vec![label.to_string()],
                    font_size: config.font_size - 2.0,
                    color: palette("#475569"),
                    text_anchor: TextAnchor::Start,
                },
            );
        }
    }

    if let Some(cluster) = diagram.cluster(cluster_id) {
        for child in cluster.children() {
            if let ChildRef::Cluster(id) = child {
                push_clusters(diagram, positioned, config, offset, *id, scene);
            }
        }
    }
}

fn push_node(node: &crate::model::Node, bounds: Bounds, config: &RenderConfig, scene: &mut Scene) {
    let accent = node.glyph().accent().clone();

    scene.push(
        RenderLayer::Node,
        DrawCommand::Rect {
            bounds,
            corner_radius: config.corner_radius,
            fill: Some(palette("white")),
            stroke: StrokeDefinition::solid(accent.clone(), 1.5),
        },
    );

    scene.push(
        RenderLayer::Label,
        DrawCommand::Text {
            anchor: Point::new(bounds.center().x(), bounds.min_y() + BADGE_BASELINE),
            lines: vec![node.glyph().badge().to_string()],
            font_size: BADGE_FONT_SIZE,
            color: accent,
            text_anchor: TextAnchor::Middle,
        },
    );

    // An empty label yields no lines and draws nothing below the badge.
    let lines: Vec<String> = node.label_lines().map(str::to_string).collect();
    if lines.is_empty() {
        return;
    }

    // Center the line block in the space below the badge strip.
    let block_top = bounds.min_y() + BADGE_BASELINE;
    let block_height = bounds.max_y() - block_top;
    let first_baseline = block_top
        + (block_height - (lines.len() - 1) as f32 * LINE_HEIGHT) / 2.0
        + config.font_size * 0.35;
    scene.push(
        RenderLayer::Label,
        DrawCommand::Text {
            anchor: Point::new(bounds.center().x(), first_baseline),
            lines,
            font_size: config.font_size,
            color: palette("#1e293b"),
            text_anchor: TextAnchor::Middle,
        },
    );
}

fn push_edges(
    diagram: &Diagram,
    positioned: &PositionedDiagram,
    config: &RenderConfig,
    offset: Point,
    scene: &mut Scene,
) {
    for edge in diagram.edges() {
        let (Some(source), Some(target)) = (
            positioned.bounds_of(edge.source()),
            positioned.bounds_of(edge.target()),
        ) else {
            continue;
        };
        let source = source.translate(offset);
        let target = target.translate(offset);

        let from = boundary_point(source, target.center());
        let to = boundary_point(target, source.center());

        scene.push(
            RenderLayer::Edge,
            DrawCommand::Connector {
                from,
                to,
                stroke: edge.stroke().clone(),
                arrowhead: true,
            },
        );

        if let Some(label) = edge.label() {
            scene.push(
                RenderLayer::Label,
                DrawCommand::Text {
                    anchor: label_anchor(from, to),
                    lines: vec![label.to_string()],
                    font_size: config.font_size - 2.0,
                    color: edge.stroke().color().clone(),
                    text_anchor: TextAnchor::Middle,
                },
            );
        }
    }
}

/// Midpoint of the connector, nudged perpendicular to the line so the label
/// does not sit on the stroke.
fn label_anchor(from: Point, to: Point) -> Point {
    let mid = from.midpoint(to);
    let direction = to.sub_point(from);
    let length = direction.hypot();
    if length < 1e-3 {
        return mid;
    }
    let normal = Point::new(-direction.y() / length, direction.x() / length);
    mid.add_point(normal.scale(EDGE_LABEL_OFFSET))
}

/// The point where a ray from the box center toward `external` crosses the
/// box border. Falls back to the center for degenerate rays.
fn boundary_point(bounds: Bounds, external: Point) -> Point {
    let center = bounds.center();
    let direction = external.sub_point(center);
    let length = direction.hypot();
    if length < 1e-3 {
        return center;
    }
    let dx = direction.x() / length;
    let dy = direction.y() / length;

    let mut t = f32::MAX;
    for edge_t in [
        (bounds.min_y() - center.y()) / dy,
        (bounds.max_y() - center.y()) / dy,
    ] {
        if edge_t.is_finite() && edge_t > 0.0 && edge_t < t {
            let x = center.x() + edge_t * dx;
            if x >= bounds.min_x() - 1e-3 && x <= bounds.max_x() + 1e-3 {
                t = edge_t;
            }
        }
    }
    for edge_t in [
        (bounds.min_x() - center.x()) / dx,
        (bounds.max_x() - center.x()) / dx,
    ] {
        if edge_t.is_finite() && edge_t > 0.0 && edge_t < t {
            let y = center.y() + edge_t * dy;
            if y >= bounds.min_y() - 1e-3 && y <= bounds.max_y() + 1e-3 {
                t = edge_t;
            }
        }
    }

    if t == f32::MAX {
        return center;
    }
    Point::new(center.x() + t * dx, center.y() + t * dy)
}

fn palette(css: &str) -> Color {
    Color::new(css).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use vellum_core::geometry::Size;

    use super::*;
    use crate::builder::DiagramBuilder;
    use crate::layout;

    fn simple_scene() -> Scene {
        let mut builder = DiagramBuilder::new("scene");
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "database", "relational", "B").unwrap();
        builder.edge(a, b).unwrap();
        let diagram = builder.finish().unwrap();
        let positioned = layout::resolve(&diagram).unwrap();
        build_scene(&diagram, &positioned, &RenderConfig::default())
    }

    #[test]
    fn boundary_point_hits_the_facing_edge() {
        let bounds = Bounds::from_origin_size(Point::new(0.0, 0.0), Size::new(100.0, 60.0));
        let hit = boundary_point(bounds, Point::new(50.0, 200.0));
        assert_approx_eq!(f32, hit.x(), 50.0, epsilon = 1e-3);
        assert_approx_eq!(f32, hit.y(), 60.0, epsilon = 1e-3);

        let hit = boundary_point(bounds, Point::new(-100.0, 30.0));
        assert_approx_eq!(f32, hit.x(), 0.0, epsilon = 1e-3);
        assert_approx_eq!(f32, hit.y(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn boundary_point_degenerate_ray_returns_center() {
        let bounds = Bounds::from_origin_size(Point::new(0.0, 0.0), Size::new(100.0, 60.0));
        let center = bounds.center();
        assert_eq!(boundary_point(bounds, center), center);
    }

    #[test]
    fn connectors_stop_at_box_borders() {
        let scene = simple_scene();
        let commands = scene.into_commands();
        let connector = commands.iter().find_map(|(_, command)| match command {
            DrawCommand::Connector { from, to, .. } => Some((*from, *to)),
            _ => None,
        });
        let (from, to) = connector.expect("scene has one connector");
        // Vertical flow: the connector leaves the bottom of the source and
        // enters the top of the target.
        assert!(from.y() < to.y());
    }

    #[test]
    fn layers_cover_nodes_edges_and_labels() {
        let commands = simple_scene().into_commands();
        let has = |layer: RenderLayer| commands.iter().any(|(l, _)| *l == layer);
        assert!(has(RenderLayer::Node));
        assert!(has(RenderLayer::Edge));
        assert!(has(RenderLayer::Label));
        assert!(!has(RenderLayer::Background));
    }

    #[test]
    fn background_color_emits_a_background_rect() {
        let mut builder =
            DiagramBuilder::new("bg").with_background(Color::new("#f8fafc").unwrap());
        builder.node("a", "compute", "server", "A").unwrap();
        let diagram = builder.finish().unwrap();
        let positioned = layout::resolve(&diagram).unwrap();
        let scene = build_scene(&diagram, &positioned, &RenderConfig::default());
        assert!(
            scene
                .into_commands()
                .iter()
                .any(|(layer, _)| *layer == RenderLayer::Background)
        );
    }

    #[test]
    fn empty_label_node_renders_badge_only() {
        let mut builder = DiagramBuilder::new("blank-label");
        builder.node("a", "compute", "server", "").unwrap();
        let diagram = builder.finish().unwrap();
        let positioned = layout::resolve(&diagram).unwrap();
        let scene = build_scene(&diagram, &positioned, &RenderConfig::default());
        let text_commands = scene
            .into_commands()
            .iter()
            .filter(|(_, command)| matches!(command, DrawCommand::Text { .. }))
            .count();
        // The badge strip is the only text; no label block is emitted.
        assert_eq!(text_commands, 1);
        assert!(crate::render_svg(&diagram, &RenderConfig::default()).is_ok());
    }

    #[test]
    fn edge_label_sits_off_the_line() {
        let anchor = label_anchor(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        assert_approx_eq!(f32, anchor.y(), 50.0, epsilon = 1e-3);
        assert!(anchor.x().abs() > 1.0);
    }
}
