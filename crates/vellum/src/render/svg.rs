//! SVG backend: converts a scene into an `svg::Document`.

use std::collections::HashSet;

use svg::{
    Document,
    node::element::{Definitions, Marker, Path, Rectangle, TSpan, Text},
};

use vellum_core::{
    color::Color,
    draw::{DrawCommand, Scene, StrokeDefinition, TextAnchor},
    geometry::Point,
};

use crate::render::RenderConfig;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const LINE_HEIGHT: f32 = 18.0;

/// Renders a scene into an SVG document.
///
/// The viewBox stays in layout units; `config.scale` only multiplies the
/// document's width and height attributes, so scaling never moves anything.
pub fn render_document(scene: Scene, config: &RenderConfig) -> Document {
    let size = scene.size();
    let commands = scene.into_commands();

    let mut document = Document::new()
        .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
        .set("width", size.width() * config.scale)
        .set("height", size.height() * config.scale);

    let arrow_colors: HashSet<Color> = commands
        .iter()
        .filter_map(|(_, command)| match command {
            DrawCommand::Connector {
                stroke,
                arrowhead: true,
                ..
            } => Some(stroke.color().clone()),
            _ => None,
        })
        .collect();
    if !arrow_colors.is_empty() {
        // Stable defs output: sort by the rendered color string.
        let mut colors: Vec<Color> = arrow_colors.into_iter().collect();
        colors.sort_by_key(Color::to_string);
        document = document.add(marker_definitions(&colors));
    }

    for (_, command) in commands {
        match command {
            DrawCommand::Rect {
                bounds,
                corner_radius,
                fill,
                stroke,
            } => {
                let mut rect = Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("rx", corner_radius)
                    .set(
                        "fill",
                        fill.map_or_else(|| "none".to_string(), |color| color.to_string()),
                    );
                rect = apply_stroke(rect, &stroke);
                document = document.add(rect);
            }
            DrawCommand::Connector {
                from,
                to,
                stroke,
                arrowhead,
            } => {
                let mut path = Path::new()
                    .set("d", path_data(from, to))
                    .set("fill", "none");
                path = apply_stroke(path, &stroke);
                if arrowhead {
                    path = path.set(
                        "marker-end",
                        format!("url(#arrow-{})", stroke.color().to_id_safe_string()),
                    );
                }
                document = document.add(path);
            }
            DrawCommand::Text {
                anchor,
                lines,
                font_size,
                color,
                text_anchor,
            } => {
                document = document.add(text_block(anchor, lines, font_size, &color, text_anchor));
            }
        }
    }

    document
}

/// Renders a scene straight to an SVG string.
pub fn render_string(scene: Scene, config: &RenderConfig) -> String {
    render_document(scene, config).to_string()
}

fn path_data(from: Point, to: Point) -> String {
    format!("M {} {} L {} {}", from.x(), from.y(), to.x(), to.y())
}

fn apply_stroke<T: svg::Node>(element: T, stroke: &StrokeDefinition) -> T {
    let mut element = element;
    element.assign("stroke", stroke.color());
    element.assign("stroke-width", stroke.width());
    if let Some(dash) = stroke.style().dash_array() {
        element.assign("stroke-dasharray", dash);
    }
    element
}

fn text_block(
    anchor: Point,
    lines: Vec<String>,
    font_size: f32,
    color: &Color,
    text_anchor: TextAnchor,
) -> Text {
    let anchor_value = match text_anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
    };
    let mut text = Text::new("")
        .set("text-anchor", anchor_value)
        .set("font-family", FONT_FAMILY)
        .set("font-size", font_size)
        .set("fill", color.to_string());
    for (index, line) in lines.into_iter().enumerate() {
        text = text.add(
            TSpan::new(line)
                .set("x", anchor.x())
                .set("y", anchor.y() + index as f32 * LINE_HEIGHT),
        );
    }
    text
}

fn marker_definitions(colors: &[Color]) -> Definitions {
    let mut defs = Definitions::new();
    for color in colors {
        let marker = Marker::new()
            .set("id", format!("arrow-{}", color.to_id_safe_string()))
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", color.to_string()),
            );
        defs = defs.add(marker);
    }
    defs
}
