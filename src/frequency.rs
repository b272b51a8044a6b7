//! Word-frequency trends over time, with an optional timeline of events,
//! expressed as Vega-Lite chart specifications.

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::config::DateRange;
use crate::table::{TimelineEvent, Unigram, filter_dates};

pub(crate) const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Width of concatenated charts; they cannot stretch to their container.
pub const CHART_WIDTH: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrequencyChartOptions {
    /// Scatter of translucent points instead of lines.
    pub point_chart: bool,
    /// Stack a timeline under the trend chart; brushing it zooms the trend.
    pub timeline: bool,
}

/// Unigram rows of the selected words inside the date range.
pub fn select_series(unigrams: &[Unigram], words: &[String], range: &DateRange) -> Vec<Unigram> {
    filter_dates(unigrams, range)
        .into_iter()
        .filter(|u| words.contains(&u.word))
        .collect()
}

pub fn timeline_events(events: &[TimelineEvent], range: &DateRange) -> Vec<TimelineEvent> {
    filter_dates(events, range)
}

/// Summed frequency per word, largest first; ties keep first appearance.
pub fn word_totals(series: &[Unigram]) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for u in series {
        let entry = sums.entry(u.word.as_str()).or_insert_with(|| {
            order.push(u.word.clone());
            0.0
        });
        *entry += u.frequency;
    }
    let mut totals: Vec<(String, f64)> = order
        .into_iter()
        .map(|w| {
            let sum = sums[w.as_str()];
            (w, sum)
        })
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

fn date_axis(domain: Value) -> Value {
    json!({
        "field": "date",
        "type": "temporal",
        "title": "date",
        "scale": { "domain": domain },
        "axis": { "format": "%Y-%m-%d" }
    })
}

fn word_colour() -> Value {
    json!({
        "field": "word",
        "type": "nominal",
        "legend": { "orient": "top", "title": "Selected words:" }
    })
}

fn tooltip() -> Value {
    json!([
        { "field": "word", "type": "nominal" },
        { "field": "date", "type": "temporal" },
        { "field": "frequency", "type": "quantitative" }
    ])
}

fn legend_param() -> Value {
    json!({
        "name": "legend",
        "select": { "type": "point", "fields": ["word"] },
        "bind": "legend"
    })
}

fn trend_chart(series: &[Unigram], domain: Value, options: FrequencyChartOptions) -> Value {
    let data = json!({ "values": series });
    if options.point_chart {
        json!({
            "data": data,
            "layer": [{
                "params": [legend_param()],
                "mark": { "type": "circle" },
                "encoding": {
                    "x": date_axis(domain),
                    "y": { "field": "frequency", "type": "quantitative", "impute": { "value": 0 } },
                    "color": word_colour(),
                    "opacity": {
                        "condition": { "param": "legend", "value": 0.5 },
                        "value": 0.15
                    },
                    "tooltip": tooltip()
                }
            }]
        })
    } else {
        let encoding = json!({
            "x": date_axis(domain),
            "y": { "field": "frequency", "type": "quantitative" },
            "color": word_colour(),
            "opacity": {
                "condition": { "param": "legend", "value": 1 },
                "value": 0.25
            },
            "tooltip": tooltip()
        });
        let mut points = encoding.clone();
        points["opacity"] = json!({ "value": 0 });
        json!({
            "data": data,
            "layer": [
                {
                    "params": [legend_param()],
                    "mark": { "type": "line", "size": 2 },
                    "encoding": encoding
                },
                {
                    "mark": { "type": "circle", "size": 60 },
                    "encoding": points
                }
            ]
        })
    }
}

fn timeline_chart(events: &[TimelineEvent], range: &DateRange) -> Value {
    let domain = json!([range.start.to_string(), range.end.to_string()]);
    let mut x = date_axis(domain);
    x["axis"]["gridColor"] = json!("#eee");
    let y = json!({
        "field": "position",
        "type": "quantitative",
        "axis": {
            "domainOpacity": 0, "labelOpacity": 0, "tickOpacity": 0,
            "title": null, "grid": false
        }
    });
    json!({
        "data": { "values": events },
        "width": CHART_WIDTH,
        "height": 400,
        "layer": [
            {
                "mark": { "type": "point", "size": 6, "color": "#E75480" },
                "encoding": {
                    "x": x,
                    "y": y,
                    "tooltip": [
                        { "field": "date", "type": "temporal" },
                        { "field": "description", "type": "nominal" }
                    ]
                }
            },
            {
                "params": [{
                    "name": "brush",
                    "select": { "type": "interval", "encodings": ["x"] }
                }],
                "mark": {
                    "type": "text", "align": "center", "baseline": "bottom",
                    "fontSize": 10, "lineBreak": "\n", "limit": 80, "dx": 6, "dy": -16
                },
                "encoding": {
                    "x": x,
                    "y": y,
                    "text": { "field": "summary", "type": "nominal" }
                }
            }
        ]
    })
}

fn totals_chart(series: &[Unigram]) -> Value {
    json!({
        "data": { "values": series },
        "mark": { "type": "bar" },
        "encoding": {
            "x": { "field": "word", "type": "nominal", "sort": "-y" },
            "y": { "aggregate": "sum", "field": "frequency", "type": "quantitative" },
            "color": { "field": "word", "type": "nominal", "legend": null },
            "opacity": {
                "condition": { "param": "legend", "value": 1 },
                "value": 0.25
            },
            "tooltip": [
                { "field": "word", "type": "nominal" },
                { "aggregate": "sum", "field": "frequency", "type": "quantitative" }
            ]
        }
    })
}

/// Vega-Lite specification of the word-frequency section: the trend chart
/// concatenated with either the timeline (vertically) or per-word totals
/// (horizontally).
pub fn frequency_chart_spec(
    series: &[Unigram],
    events: &[TimelineEvent],
    range: &DateRange,
    options: FrequencyChartOptions,
) -> Value {
    if options.timeline {
        let mut trend = trend_chart(series, json!({ "param": "brush" }), options);
        trend["width"] = json!(CHART_WIDTH);
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "vconcat": [trend, timeline_chart(events, range)]
        })
    } else {
        let domain = json!([range.start.to_string(), range.end.to_string()]);
        let mut trend = trend_chart(series, domain, options);
        trend["width"] = json!(CHART_WIDTH - 200);
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "hconcat": [trend, totals_chart(series)],
            "config": {
                "legend": { "titleFontSize": 14, "titleFontWeight": 500, "labelFontSize": 14 }
            }
        })
    }
}
