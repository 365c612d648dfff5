//! Position resolution for sealed diagrams.
//!
//! A diagram is laid out by exactly one of two strategies, decided when the
//! builder sealed it: the automatic resolver computes ranked positions from
//! the edge structure, the manual resolver only validates the boxes the
//! caller supplied. Both produce a [`PositionedDiagram`] mapping every node
//! and cluster id to absolute canvas bounds.

mod automatic;
mod manual;
mod positioned;

use log::info;
use thiserror::Error;

use crate::model::{Diagram, LayoutMode};

pub use positioned::PositionedDiagram;

/// Margin between a cluster border and its children.
pub(crate) const CLUSTER_MARGIN: f32 = 16.0;
/// Extra vertical space reserved at the top of a labeled cluster.
pub(crate) const CLUSTER_LABEL_STRIP: f32 = 22.0;

/// Errors surfaced while validating manually placed elements.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Two sibling boxes overlap.
    #[error("elements '{first}' and '{second}' overlap")]
    Overlap { first: String, second: String },

    /// A child box escapes its parent cluster's content area.
    #[error("element '{child}' lies outside cluster '{parent}'")]
    OutOfBounds { child: String, parent: String },
}

/// Resolves positions for every element of the diagram.
///
/// Resolving the same diagram twice yields identical bounds.
pub fn resolve(diagram: &Diagram) -> Result<PositionedDiagram, LayoutError> {
    let positioned = match diagram.layout_mode() {
        LayoutMode::Automatic => automatic::resolve(diagram),
        LayoutMode::Manual => manual::resolve(diagram)?,
    };

    info!(
        title = diagram.title(),
        elements = positioned.len(),
        width = positioned.canvas().width(),
        height = positioned.canvas().height();
        "Layout resolved",
    );
    Ok(positioned)
}
