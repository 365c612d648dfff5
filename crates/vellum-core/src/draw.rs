//! Backend-neutral drawing primitives.
//!
//! Renderers produce a [`Scene`] of [`DrawCommand`]s tagged with a
//! [`RenderLayer`]; output backends (SVG, raster) consume the scene without
//! knowing anything about diagrams.

mod command;
mod layer;
mod stroke;

pub use command::{DrawCommand, TextAnchor};
pub use layer::{RenderLayer, Scene};
pub use stroke::{StrokeDefinition, StrokeStyle};
