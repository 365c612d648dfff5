//! Text-grid backend: renders a diagram as Unicode box-drawing text.
//!
//! This path skips layout entirely. Elements render top-to-bottom in
//! declaration order: nodes as single-line bordered cells, clusters as
//! double-line frames whose children indent inside the frame. Edges cannot
//! be drawn spatially, so they append as a legend below the grid.

use serde::Deserialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::{ChildRef, Cluster, Diagram, Node};

/// Frame characters for one border style.
struct FrameChars {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

const SINGLE: FrameChars = FrameChars {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
};

const DOUBLE: FrameChars = FrameChars {
    top_left: '╔',
    top_right: '╗',
    bottom_left: '╚',
    bottom_right: '╝',
    horizontal: '═',
    vertical: '║',
};

/// Outer width of each nesting level lost to frame characters and padding.
const FRAME_OVERHEAD: usize = 4;
/// Narrowest cell that still fits a frame, padding, and one content column.
const MIN_CELL_WIDTH: usize = 8;

/// Settings for the text-grid renderer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextGridConfig {
    /// Total width of a top-level cell, borders included. Labels wider than
    /// the cell truncate; the grid never widens to fit them.
    pub cell_width: usize,
}

impl Default for TextGridConfig {
    fn default() -> Self {
        Self { cell_width: 40 }
    }
}

/// Renders the diagram as box-drawing text.
pub fn render(diagram: &Diagram, config: &TextGridConfig) -> String {
    let width = config.cell_width.max(MIN_CELL_WIDTH);
    let mut lines = Vec::new();

    lines.push(fit(diagram.title(), width));
    lines.push(String::new());

    if let Some(root) = diagram.cluster(diagram.root()) {
        render_children(diagram, root, width, &mut lines);
    }

    if !diagram.edges().is_empty() {
        lines.push(String::new());
        for edge in diagram.edges() {
            let mut entry = format!("{} → {}", edge.source(), edge.target());
            if let Some(label) = edge.label() {
                entry.push_str(": ");
                entry.push_str(label);
            }
            lines.push(fit(&entry, width));
        }
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn render_children(diagram: &Diagram, cluster: &Cluster, width: usize, out: &mut Vec<String>) {
    let mut first = true;
    for child in cluster.children() {
        if !first {
            out.push(String::new());
        }
        first = false;
        match child {
            ChildRef::Node(id) => {
                if let Some(node) = diagram.node(*id) {
                    render_node(node, width, out);
                }
            }
            ChildRef::Cluster(id) => {
                if let Some(inner) = diagram.cluster(*id) {
                    render_cluster(diagram, inner, width, out);
                }
            }
        }
    }
}

fn render_node(node: &Node, width: usize, out: &mut Vec<String>) {
    let inner = width - FRAME_OVERHEAD;
    out.push(top_border(&SINGLE, None, width));
    for line in node.label_lines() {
        out.push(content_row(&SINGLE, line, inner));
    }
    out.push(bottom_border(&SINGLE, width));
}

fn render_cluster(diagram: &Diagram, cluster: &Cluster, width: usize, out: &mut Vec<String>) {
    let inner = width - FRAME_OVERHEAD;
    out.push(top_border(&DOUBLE, cluster.label(), width));

    let mut body = Vec::new();
    render_children(diagram, cluster, inner.max(MIN_CELL_WIDTH), &mut body);
    for line in body {
        out.push(content_row(&DOUBLE, &line, inner));
    }

    out.push(bottom_border(&DOUBLE, width));
}

fn top_border(chars: &FrameChars, label: Option<&str>, width: usize) -> String {
    let fill_width = width - 2;
    let mut bar = match label {
        Some(label) => {
            // "╔═ Label ═══╗" with the label eating into the rule.
            let text = fit(label, fill_width.saturating_sub(4));
            let used = 3 + text.width();
            let mut bar = format!("{} {} ", chars.horizontal, text);
            bar.push_str(
                &chars
                    .horizontal
                    .to_string()
                    .repeat(fill_width.saturating_sub(used)),
            );
            bar
        }
        None => chars.horizontal.to_string().repeat(fill_width),
    };
    bar = format!("{}{}{}", chars.top_left, bar, chars.top_right);
    bar
}

fn bottom_border(chars: &FrameChars, width: usize) -> String {
    format!(
        "{}{}{}",
        chars.bottom_left,
        chars.horizontal.to_string().repeat(width - 2),
        chars.bottom_right,
    )
}

fn content_row(chars: &FrameChars, content: &str, inner: usize) -> String {
    let text = fit(content, inner);
    let padding = inner.saturating_sub(text.width());
    format!(
        "{} {}{} {}",
        chars.vertical,
        text,
        " ".repeat(padding),
        chars.vertical,
    )
}

/// Truncates `text` to `max` display columns, marking the cut with `…`.
fn fit(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max.saturating_sub(1) {
            break;
        }
        result.push(ch);
        used += ch_width;
    }
    result.push('…');
    result
}
