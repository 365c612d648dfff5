//! Diagram renderers.
//!
//! The vector path goes through two stages: [`scene::build_scene`] turns a
//! positioned diagram into a backend-neutral [`Scene`](vellum_core::draw::Scene)
//! of draw commands, and [`svg::render_document`] turns that scene into an
//! `svg::Document`. The text-grid renderer in [`textgrid`] is a separate
//! single-stage path that reads the diagram directly and performs no 2-D
//! layout at all.

pub mod scene;
pub mod svg;
pub mod textgrid;

pub use scene::{RenderConfig, build_scene};
pub use textgrid::TextGridConfig;
