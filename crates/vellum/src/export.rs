//! Multi-format file export.
//!
//! SVG is the source of truth: the diagram is rendered to SVG once, and PNG
//! and PDF derive from that string via `resvg` and `svg2pdf`. The text grid
//! renders independently. Every file goes through a named temp file in the
//! output directory and is persisted by rename, so an interrupted export
//! never leaves a partial file behind. One failing target does not abort the
//! rest; failures are collected in the report.

use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
};

use log::{info, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{
    config::AppConfig,
    error::VellumError,
    layout,
    model::Diagram,
    render::{self, RenderConfig, TextGridConfig},
};

/// Reference resolution: a PNG without an explicit DPI rasterizes 1:1.
const BASE_DPI: u32 = 96;

/// An output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Svg => "SVG",
            Self::Png => "PNG",
            Self::Pdf => "PDF",
            Self::Text => "text",
        }
    }
}

/// One requested output file: a format plus an optional resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTarget {
    format: ExportFormat,
    dpi: Option<u32>,
}

impl ExportTarget {
    pub fn svg() -> Self {
        Self {
            format: ExportFormat::Svg,
            dpi: None,
        }
    }

    pub fn png() -> Self {
        Self {
            format: ExportFormat::Png,
            dpi: None,
        }
    }

    /// A PNG rasterized at the given resolution. The DPI becomes part of the
    /// file name, so several resolutions of one diagram can coexist.
    pub fn png_at(dpi: u32) -> Self {
        Self {
            format: ExportFormat::Png,
            dpi: Some(dpi),
        }
    }

    pub fn pdf() -> Self {
        Self {
            format: ExportFormat::Pdf,
            dpi: None,
        }
    }

    pub fn text() -> Self {
        Self {
            format: ExportFormat::Text,
            dpi: None,
        }
    }

    pub fn format(self) -> ExportFormat {
        self.format
    }

    /// `<slug>.<ext>`, with `@<dpi>` appended to the stem for explicit
    /// resolutions.
    pub fn file_name(self, slug: &str) -> String {
        match self.dpi {
            Some(dpi) => format!("{slug}@{dpi}.{}", self.format.extension()),
            None => format!("{slug}.{}", self.format.extension()),
        }
    }

    fn raster_scale(self) -> f32 {
        self.dpi.unwrap_or(BASE_DPI) as f32 / BASE_DPI as f32
    }
}

/// A failure to produce one export target.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render {format} output for '{path}': {reason}")]
    Render {
        format: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to write {format} output to '{path}'")]
    Write {
        format: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The outcome of an export run: files written and targets that failed.
#[derive(Debug, Default)]
pub struct ExportReport {
    written: Vec<PathBuf>,
    failures: Vec<ExportError>,
}

impl ExportReport {
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn failures(&self) -> &[ExportError] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes diagrams to disk in one or more formats.
pub struct Exporter {
    output_dir: PathBuf,
    render_config: RenderConfig,
    grid_config: TextGridConfig,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            render_config: RenderConfig::default(),
            grid_config: TextGridConfig::default(),
        }
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render_config = config;
        self
    }

    pub fn with_grid_config(mut self, config: TextGridConfig) -> Self {
        self.grid_config = config;
        self
    }

    /// Applies both renderer settings from a combined [`AppConfig`].
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.render_config = config.render().clone();
        self.grid_config = config.grid().clone();
        self
    }

    /// Exports the diagram once per target.
    ///
    /// Failures that poison every target return `Err`: the output directory
    /// cannot be created, or a manual layout fails validation. Per-target
    /// failures land in the report instead.
    pub fn export(
        &self,
        diagram: &Diagram,
        targets: &[ExportTarget],
    ) -> Result<ExportReport, VellumError> {
        fs::create_dir_all(&self.output_dir)?;

        let needs_vector = targets
            .iter()
            .any(|target| target.format != ExportFormat::Text);
        let svg = if needs_vector {
            let positioned = layout::resolve(diagram)?;
            let scene = render::build_scene(diagram, &positioned, &self.render_config);
            Some(render::svg::render_string(scene, &self.render_config))
        } else {
            None
        };

        let mut report = ExportReport::default();
        for target in targets {
            let path = self.output_dir.join(target.file_name(diagram.slug()));
            let result = match target.format {
                ExportFormat::Svg => self.write_file(target, &path, svg_bytes(&svg)),
                ExportFormat::Png => rasterize_png(svg_str(&svg), target.raster_scale())
                    .map_err(|reason| ExportError::Render {
                        format: target.format.name(),
                        path: path.clone(),
                        reason,
                    })
                    .and_then(|bytes| self.write_file(target, &path, &bytes)),
                ExportFormat::Pdf => convert_pdf(svg_str(&svg))
                    .map_err(|reason| ExportError::Render {
                        format: target.format.name(),
                        path: path.clone(),
                        reason,
                    })
                    .and_then(|bytes| self.write_file(target, &path, &bytes)),
                ExportFormat::Text => {
                    let grid = render::textgrid::render(diagram, &self.grid_config);
                    self.write_file(target, &path, grid.as_bytes())
                }
            };

            match result {
                Ok(()) => {
                    info!(path:? = path, format = target.format.name(); "Export written");
                    report.written.push(path);
                }
                Err(failure) => {
                    warn!(path:? = path, format = target.format.name(); "Export failed");
                    report.failures.push(failure);
                }
            }
        }

        Ok(report)
    }

    /// Atomic write: temp file in the destination directory, then rename.
    fn write_file(
        &self,
        target: &ExportTarget,
        path: &Path,
        bytes: &[u8],
    ) -> Result<(), ExportError> {
        let write = |path: &Path| -> io::Result<()> {
            let mut file = NamedTempFile::new_in(&self.output_dir)?;
            file.write_all(bytes)?;
            file.persist(path)?;
            Ok(())
        };
        write(path).map_err(|source| ExportError::Write {
            format: target.format.name(),
            path: path.to_path_buf(),
            source,
        })
    }
}

fn svg_str(svg: &Option<String>) -> &str {
    svg.as_deref().unwrap_or_default()
}

fn svg_bytes(svg: &Option<String>) -> &[u8] {
    svg_str(svg).as_bytes()
}

fn rasterize_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|err| format!("SVG parse failed: {err}"))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("pixmap allocation failed for {width}x{height}"))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|err| format!("PNG encoding failed: {err}"))
}

fn convert_pdf(svg: &str) -> Result<Vec<u8>, String> {
    let mut options = svg2pdf::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = svg2pdf::usvg::Tree::from_str(svg, &options)
        .map_err(|err| format!("SVG parse failed: {err}"))?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|err| format!("PDF conversion failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DiagramBuilder;

    fn diagram() -> Diagram {
        let mut builder = DiagramBuilder::new("Export Sample");
        let a = builder.node("a", "compute", "server", "A").unwrap();
        let b = builder.node("b", "database", "relational", "B").unwrap();
        builder.edge(a, b).unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn svg_and_text_targets_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let report = exporter
            .export(&diagram(), &[ExportTarget::svg(), ExportTarget::text()])
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written().len(), 2);
        assert!(dir.path().join("export-sample.svg").is_file());
        assert!(dir.path().join("export-sample.txt").is_file());
    }

    #[test]
    fn explicit_dpi_lands_in_the_file_name() {
        assert_eq!(
            ExportTarget::png_at(192).file_name("demo"),
            "demo@192.png"
        );
        assert_eq!(ExportTarget::png().file_name("demo"), "demo.png");
    }

    #[test]
    fn combined_config_sets_both_renderers() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::new(
            RenderConfig::default(),
            TextGridConfig { cell_width: 24 },
        );
        let report = Exporter::new(dir.path())
            .with_config(config)
            .export(&diagram(), &[ExportTarget::text()])
            .unwrap();
        assert!(report.is_complete());

        let text = fs::read_to_string(dir.path().join("export-sample.txt")).unwrap();
        assert!(text.lines().all(|line| line.chars().count() <= 24));
    }

    #[test]
    fn missing_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let report = Exporter::new(&nested)
            .export(&diagram(), &[ExportTarget::text()])
            .unwrap();
        assert!(report.is_complete());
        assert!(nested.join("export-sample.txt").is_file());
    }

    #[test]
    fn one_failing_target_does_not_abort_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the text output path makes the rename
        // fail for that target only.
        fs::create_dir(dir.path().join("export-sample.txt")).unwrap();

        let report = Exporter::new(dir.path())
            .export(
                &diagram(),
                &[ExportTarget::text(), ExportTarget::svg(), ExportTarget::pdf()],
            )
            .unwrap();

        assert_eq!(report.failures().len(), 1);
        assert!(matches!(
            report.failures()[0],
            ExportError::Write { format: "text", .. }
        ));
        assert_eq!(report.written().len(), 2);
        assert!(dir.path().join("export-sample.svg").is_file());
        assert!(dir.path().join("export-sample.pdf").is_file());
    }

    #[test]
    fn invalid_manual_layout_fails_the_whole_export() {
        let mut builder = DiagramBuilder::new("bad manual");
        builder
            .placed_node(
                "a",
                "compute",
                "server",
                "A",
                vellum_core::geometry::Point::new(0.0, 0.0),
                vellum_core::geometry::Size::new(100.0, 60.0),
            )
            .unwrap();
        builder
            .placed_node(
                "b",
                "compute",
                "server",
                "B",
                vellum_core::geometry::Point::new(50.0, 30.0),
                vellum_core::geometry::Size::new(100.0, 60.0),
            )
            .unwrap();
        let diagram = builder.finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let result = Exporter::new(dir.path()).export(&diagram, &[ExportTarget::svg()]);
        assert!(matches!(result, Err(VellumError::Layout(_))));
    }
}
