//! Vellum - declarative composition of architecture diagrams.
//!
//! A diagram is assembled through the builder API (nodes, nested clusters,
//! labeled edges), sealed into an immutable model, positioned by one of two
//! layout strategies, and rendered to SVG, PNG, PDF, or a Unicode text grid.
//!
//! # Examples
//!
//! ```
//! use vellum::builder::DiagramBuilder;
//!
//! let mut builder = DiagramBuilder::new("Web Service");
//! let lb = builder.node("lb", "network", "load-balancer", "ALB")?;
//! let mut db = None;
//! builder.cluster("app", "Application", |b| {
//!     let api = b.node("api", "compute", "server", "API")?;
//!     db = Some(b.node("db", "database", "relational", "PostgreSQL")?);
//!     b.edge(api, db.unwrap())?;
//!     b.edge(lb, api)
//! })?;
//! let diagram = builder.finish()?;
//!
//! let svg = vellum::render_svg(&diagram, &Default::default())?;
//! assert!(svg.starts_with("<svg"));
//! # Ok::<(), vellum::VellumError>(())
//! ```

pub mod builder;
pub mod config;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;

mod error;

pub use error::VellumError;

pub use vellum_core::{color, draw, geometry, identifier, symbol};

use model::Diagram;
use render::{RenderConfig, TextGridConfig};

/// Resolves layout and renders the diagram to an SVG string.
pub fn render_svg(diagram: &Diagram, config: &RenderConfig) -> Result<String, VellumError> {
    let positioned = layout::resolve(diagram)?;
    let scene = render::build_scene(diagram, &positioned, config);
    Ok(render::svg::render_string(scene, config))
}

/// Renders the diagram as a box-drawing text grid.
///
/// No layout pass runs for this path, so it cannot fail.
pub fn render_text(diagram: &Diagram, config: &TextGridConfig) -> String {
    render::textgrid::render(diagram, config)
}
