use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Value, json};

use crate::collocation::CollocationGraph;
use crate::error::Result;
use crate::render::{Rendered, escape_html, escape_script_json};

/// Extra height the embedding frame needs on top of the canvas height
/// (margins, padding and border of the generated page).
pub const FRAME_ALLOWANCE: u32 = 24;

const VIS_NETWORK_JS: &str = "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

#[derive(Debug, Clone)]
pub struct InteractiveStyle {
    /// CSS width of the canvas, e.g. `100%` or `500px`.
    pub width: String,
    pub height_px: u32,
    pub highlight_color: String,
    pub highlight_size: u32,
    pub default_node_size: u32,
    /// vis-network options object.
    pub options: Value,
}

impl Default for InteractiveStyle {
    fn default() -> Self {
        InteractiveStyle {
            width: "100%".to_string(),
            height_px: 800,
            highlight_color: "rgba(214,67,137,1)".to_string(),
            highlight_size: 14,
            default_node_size: 15,
            options: default_options(),
        }
    }
}

impl InteractiveStyle {
    pub fn frame_height(&self) -> u32 {
        self.height_px + FRAME_ALLOWANCE
    }
}

/// Colours and repulsion physics; the configuration panel stays hidden.
pub fn default_options() -> Value {
    json!({
        "configure": { "enabled": false },
        "nodes": {
            "borderWidth": 0,
            "borderWidthSelected": 0,
            "color": {
                "border": "rgba(255,255,255,1)",
                "background": "rgba(97,170,197,1)",
                "highlight": {
                    "border": "rgba(255,255,255,1)",
                    "background": "rgba(47,120,147,1)"
                }
            },
            "font": { "face": "sans-serif" }
        },
        "edges": {
            "color": {
                "inherit": false,
                "color": "rgba(200,200,200,0.75)",
                "highlight": "rgba(140,140,140,0.75)"
            },
            "smooth": false
        },
        "physics": {
            "repulsion": {
                "centralGravity": 0.5,
                "springLength": 75,
                "springConstant": 0.0125
            },
            "minVelocity": 0.75,
            "solver": "repulsion"
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub shape: &'static str,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    /// vis-network scales edge width by `value`.
    pub value: f64,
    pub title: String,
    /// The metric under its own column name (`pmi` or `f_xy`).
    #[serde(flatten)]
    pub metric: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNetwork {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

/// Per-node and per-edge attributes for the renderer: highlight words get
/// their own colour and size, every edge copies its metric into `value`.
pub fn network_data(
    graph: &CollocationGraph,
    highlight: &BTreeSet<String>,
    style: &InteractiveStyle,
) -> VisNetwork {
    let nodes = graph
        .nodes()
        .map(|word| {
            let hl = highlight.contains(word);
            VisNode {
                id: word.to_string(),
                label: word.to_string(),
                shape: "dot",
                size: if hl { style.highlight_size } else { style.default_node_size },
                color: hl.then(|| style.highlight_color.clone()),
            }
        })
        .collect();
    let column = graph.metric().column();
    let edges = graph
        .edges()
        .into_iter()
        .map(|e| VisEdge {
            title: format!("{column}: {}", e.weight),
            metric: BTreeMap::from([(column.to_string(), e.weight)]),
            value: e.weight,
            from: e.source,
            to: e.target,
        })
        .collect();
    VisNetwork { nodes, edges }
}

/// Self-contained HTML page drawing the network.
pub fn render_document(
    graph: &CollocationGraph,
    highlight: &BTreeSet<String>,
    style: &InteractiveStyle,
) -> Result<Rendered> {
    let data = network_data(graph, highlight, style);
    let nodes = escape_script_json(&serde_json::to_string(&data.nodes)?);
    let edges = escape_script_json(&serde_json::to_string(&data.edges)?);
    let options = escape_script_json(&serde_json::to_string(&style.options)?);
    let document = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="{VIS_NETWORK_JS}"></script>
<style>
#network {{
  width: {width};
  height: {height}px;
  background-color: #ffffff;
  border: 1px solid lightgray;
  position: relative;
  float: left;
}}
</style>
</head>
<body>
<div id="network"></div>
<script>
var nodes = new vis.DataSet({nodes});
var edges = new vis.DataSet({edges});
var container = document.getElementById("network");
var options = {options};
var network = new vis.Network(container, {{ nodes: nodes, edges: edges }}, options);
</script>
</body>
</html>
"#,
        width = escape_html(&style.width),
        height = style.height_px,
    );
    Ok(Rendered::Html {
        document,
        frame_height: style.frame_height(),
    })
}
