//! The draw command vocabulary shared by all output backends.

use crate::{
    color::Color,
    draw::StrokeDefinition,
    geometry::{Bounds, Point},
};

/// Horizontal anchoring of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Text grows rightward from the anchor point.
    Start,
    /// Text is centered on the anchor point.
    #[default]
    Middle,
}

/// One backend-neutral drawing operation.
///
/// Commands carry only resolved geometry and style. Backends translate them
/// one-to-one into their own primitives; no command references diagram
/// entities.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A rounded rectangle with optional fill and a stroked border.
    Rect {
        bounds: Bounds,
        corner_radius: f32,
        fill: Option<Color>,
        stroke: StrokeDefinition,
    },
    /// A straight connector line, optionally with an arrowhead at `to`.
    Connector {
        from: Point,
        to: Point,
        stroke: StrokeDefinition,
        arrowhead: bool,
    },
    /// One or more lines of text anchored at a point.
    ///
    /// `anchor` marks the baseline start of the first line; subsequent lines
    /// stack downward one line-height apart.
    Text {
        anchor: Point,
        lines: Vec<String>,
        font_size: f32,
        color: Color,
        text_anchor: TextAnchor,
    },
}
