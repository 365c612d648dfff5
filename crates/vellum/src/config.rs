//! Configuration types for diagram rendering.
//!
//! All types implement [`serde::Deserialize`] so settings can load from
//! external sources, with every field defaulting individually.

use serde::Deserialize;

use crate::render::{RenderConfig, TextGridConfig};

/// Top-level configuration combining the vector and text-grid settings.
///
/// Pass it to [`Exporter::with_config`](crate::export::Exporter::with_config)
/// to apply both renderer settings at once.
///
/// # Example
///
/// ```
/// use vellum::config::AppConfig;
///
/// let config = AppConfig::default();
/// assert_eq!(config.grid().cell_width, 40);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Vector renderer settings.
    #[serde(default)]
    render: RenderConfig,

    /// Text-grid renderer settings.
    #[serde(default)]
    grid: TextGridConfig,
}

impl AppConfig {
    pub fn new(render: RenderConfig, grid: TextGridConfig) -> Self {
        Self { render, grid }
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn grid(&self) -> &TextGridConfig {
        &self.grid
    }
}
