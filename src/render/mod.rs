//! Turning collocation graphs into something a browser can show.
//!
//! Two pipelines, picked once per run: an interactive HTML document driven by
//! vis-network, or a static SVG figure laid out with a seeded spring model.
//! In comparison mode both subsets go through the same pipeline with the same
//! highlight set and style; differing node counts and therefore node sizes
//! between the two drawings carry no statistical meaning.

pub mod artifacts;
pub mod figure;
pub mod interactive;
pub mod layout;

use std::collections::BTreeSet;

use crate::collocation::CollocationGraph;
use crate::config::RenderPipeline;
use crate::error::Result;

pub use artifacts::ArtifactStore;
pub use figure::FigureStyle;
pub use interactive::InteractiveStyle;
pub use layout::SpringParams;

/// Output of either pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Complete HTML document plus the height of the frame that embeds it.
    Html { document: String, frame_height: u32 },
    /// Standalone SVG figure.
    Svg(String),
}

impl Rendered {
    pub fn extension(&self) -> &'static str {
        match self {
            Rendered::Html { .. } => "html",
            Rendered::Svg(_) => "svg",
        }
    }

    pub fn contents(&self) -> &str {
        match self {
            Rendered::Html { document, .. } => document,
            Rendered::Svg(svg) => svg,
        }
    }
}

/// Styling shared by both panes of a comparison.
#[derive(Debug, Clone, Default)]
pub struct NetworkStyle {
    pub interactive: InteractiveStyle,
    pub figure: FigureStyle,
}

/// Renders a collocation graph, distinguishing `highlight` words (the focus
/// words) from their collocates.
pub fn render(
    graph: &CollocationGraph,
    highlight: &BTreeSet<String>,
    pipeline: RenderPipeline,
    style: &NetworkStyle,
) -> Result<Rendered> {
    match pipeline {
        RenderPipeline::Interactive => interactive::render_document(graph, highlight, &style.interactive),
        RenderPipeline::Static => figure::render_figure(graph, highlight, &style.figure),
    }
}

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Makes serialized JSON safe to inline in a `<script>` block. `<`, `>`
/// and `&` only occur inside JSON strings, where the `\uXXXX` escapes
/// decode to the same characters.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
