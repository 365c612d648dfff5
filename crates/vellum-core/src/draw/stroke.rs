//! Stroke definitions for borders and connectors.
//!
//! Follows SVG/CSS terminology: a stroke has a color, a width, and a dash
//! style that maps onto `stroke-dasharray`.

use crate::color::Color;

/// The dash pattern of a stroke.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StrokeStyle {
    /// A continuous line (no dash array).
    #[default]
    Solid,
    /// Evenly dashed line ("5,5").
    Dashed,
    /// Dotted line ("1,3").
    Dotted,
    /// A custom SVG dash array such as "10,5,2,5".
    Custom(String),
}

impl StrokeStyle {
    /// The SVG `stroke-dasharray` value, or `None` for solid strokes.
    pub fn dash_array(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("1,3".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }
}

/// Visual definition of a stroked line.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    pub fn new(color: Color, width: f32, style: StrokeStyle) -> Self {
        Self {
            color,
            width,
            style,
        }
    }

    /// A solid stroke in the given color and width.
    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Solid)
    }

    /// A dashed stroke in the given color and width.
    pub fn dashed(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Dashed)
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}
