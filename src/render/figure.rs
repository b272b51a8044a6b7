use std::collections::BTreeSet;

use petgraph::visit::EdgeRef;
use plotters::prelude::*;

use crate::collocation::CollocationGraph;
use crate::error::{ExplorerError, Result};
use crate::render::Rendered;
use crate::render::layout::{SpringParams, spring_layout};

#[derive(Debug, Clone)]
pub struct FigureStyle {
    pub size: (u32, u32),
    pub margin: u32,
    pub node_radius: u32,
    pub edge_width: u32,
    pub font_size: u32,
    pub spring: SpringParams,
}

impl Default for FigureStyle {
    fn default() -> Self {
        FigureStyle {
            size: (1000, 1000),
            margin: 60,
            node_radius: 9,
            edge_width: 4,
            font_size: 14,
            spring: SpringParams::default(),
        }
    }
}

/// Light and dark ends of the node (red) and edge (blue) colour ramps.
const REDS: (RGBColor, RGBColor) = (RGBColor(252, 187, 161), RGBColor(165, 15, 21));
const BLUES: (RGBColor, RGBColor) = (RGBColor(198, 219, 239), RGBColor(8, 48, 107));

fn ramp((lo, hi): (RGBColor, RGBColor), t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(lo.0, hi.0), mix(lo.1, hi.1), mix(lo.2, hi.2))
}

fn plot_err<E: std::fmt::Display>(e: E) -> ExplorerError {
    ExplorerError::Plot(e.to_string())
}

/// Draws the graph on a spring layout: focus words dark red, collocates light
/// red, edges shaded by weight from light to dark blue.
pub fn render_figure(
    graph: &CollocationGraph,
    highlight: &BTreeSet<String>,
    style: &FigureStyle,
) -> Result<Rendered> {
    let positions = spring_layout(graph.inner(), &style.spring);
    let (w, h) = style.size;
    let m = style.margin as f64;
    let to_px = |p: [f64; 2]| -> (i32, i32) {
        (
            (m + (p[0] + 1.0) / 2.0 * (w as f64 - 2.0 * m)).round() as i32,
            (m + (1.0 - p[1]) / 2.0 * (h as f64 - 2.0 * m)).round() as i32,
        )
    };
    let px: Vec<(i32, i32)> = positions.iter().copied().map(to_px).collect();

    let edges = graph.edges();
    let (lo, hi) = edges.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
        (lo.min(e.weight), hi.max(e.weight))
    });
    let shade = |weight: f64| {
        if hi > lo { (weight - lo) / (hi - lo) } else { 1.0 }
    };

    let inner = graph.inner();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, style.size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        for e in inner.edge_references() {
            let colour = ramp(BLUES, shade(*e.weight()));
            root.draw(&PathElement::new(
                vec![px[e.source().index()], px[e.target().index()]],
                colour.stroke_width(style.edge_width),
            ))
            .map_err(plot_err)?;
        }

        let font = ("sans-serif", style.font_size as f64).into_font().color(&BLACK);
        for (idx, word) in inner.node_indices().zip(graph.nodes()) {
            let (x, y) = px[idx.index()];
            let t = if highlight.contains(word) { 1.0 } else { 0.0 };
            root.draw(&Circle::new((x, y), style.node_radius, ramp(REDS, t).filled()))
                .map_err(plot_err)?;
            let offset = style.node_radius as i32 + 2;
            root.draw(&Text::new(
                word.to_string(),
                (x + offset, y - offset),
                font.clone(),
            ))
            .map_err(plot_err)?;
        }
        root.present().map_err(plot_err)?;
    }
    Ok(Rendered::Svg(svg))
}
