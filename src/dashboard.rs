//! The explorer page: an explicit settings snapshot goes in, a page of
//! blocks comes out. Every settings change is a new [`DashboardState`] and a
//! fresh call to [`render_dashboard`]; nothing is kept between renders.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::collocation::{CollocationGraph, build_collocation_graph};
use crate::config::{DateRange, Metric, RenderPipeline, Subset};
use crate::data::DashboardData;
use crate::error::Result;
use crate::frequency::{
    FrequencyChartOptions, frequency_chart_spec, select_series, timeline_events, word_totals,
};
use crate::render::{
    ArtifactStore, NetworkStyle, Rendered, escape_html, escape_script_json, render,
};
use crate::stats::{CorpusSummary, DAILY_CHARTS, daily_chart_spec};
use crate::table::filter_dates;
use crate::taxonomy::Taxonomy;

/// Words explored when the user has not picked any yet.
pub const DEFAULT_WORDS: [&str; 5] = ["truth", "facts", "lies", "scam", "hoax"];

pub const DATE_RANGE_ERROR: &str =
    "Date range selection error: The end date must be later than the start date.";
pub const NO_WORDS_SELECTED: &str = "No word selected. Please enter one or more words above.";
pub const NO_WORDS_TO_COLLOCATE: &str = "No words to collocate. Please select one or more words.";

const FREQUENCY_HELP: [&str; 2] = [
    "Word frequencies chart: hover over a line or point for details. Click a legend label to \
     highlight its words (shift-click for several, click the chart to reset). Scroll to zoom \
     around the pointer and drag to move the chart.",
    "Timeline: hover over an event for its description. Drag across the timeline to select a \
     timespan and the word frequencies chart zooms into it; drag the selection to move along \
     the date axis, click outside it to reset.",
];

const COLLOCATION_HELP: [&str; 2] = [
    "Word collocations graph: selected words are coloured differently from their collocates, \
     and the thickness of a connecting line reflects the strength of co-occurrence. Click a word \
     to highlight its connections, click empty space to reset. Scroll to zoom, drag a node to \
     move its cluster, drag empty space to move the whole graph.",
    "Please note: clusters gravitate towards each other only to stay inside the graph area, and \
     when two graphs are compared their node sizes may differ because each graph is fitted to \
     its own area. Neither has any statistical meaning.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySettings {
    pub show_chart: bool,
    pub point_chart: bool,
    pub timeline: bool,
    pub show_data: bool,
    pub show_help: bool,
}

impl Default for FrequencySettings {
    fn default() -> Self {
        FrequencySettings {
            show_chart: true,
            point_chart: false,
            timeline: false,
            show_data: false,
            show_help: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollocationSettings {
    pub show_chart: bool,
    pub metric: Metric,
    /// Collocates kept per focus word; the CLI bounds this to 1..=10.
    pub top_k: usize,
    pub compare: Option<Subset>,
    /// Words collocated in addition to the explored ones.
    pub extra_words: Vec<String>,
    pub show_data: bool,
    pub show_help: bool,
}

impl Default for CollocationSettings {
    fn default() -> Self {
        CollocationSettings {
            show_chart: false,
            metric: Metric::Pmi,
            top_k: 7,
            compare: None,
            extra_words: Vec::new(),
            show_data: false,
            show_help: false,
        }
    }
}

/// Everything the user can set on the explorer page.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub subset: Subset,
    pub range: DateRange,
    pub words: Vec<String>,
    /// Taxonomy category constraining word suggestions.
    pub category: Option<Uuid>,
    pub frequency: FrequencySettings,
    pub collocation: CollocationSettings,
}

impl DashboardState {
    pub fn new(range: DateRange) -> Self {
        DashboardState {
            subset: Subset::All,
            range,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            category: None,
            frequency: FrequencySettings::default(),
            collocation: CollocationSettings::default(),
        }
    }

    /// Explored words trimmed and lower-cased, blanks and repeats dropped,
    /// in selection order. Every section reads the selection through this.
    pub fn explored_words(&self) -> Vec<String> {
        let mut out = Vec::new();
        push_unique(&mut out, &mut HashSet::new(), normalized(&self.words));
        out
    }

    /// Explored words plus extra collocation words, lower-cased.
    pub fn focus_words(&self) -> BTreeSet<String> {
        normalized(&self.words)
            .chain(normalized(&self.collocation.extra_words))
            .collect()
    }
}

fn normalized(words: &[String]) -> impl Iterator<Item = String> + '_ {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
}

/// The category if it is still known to the taxonomy, otherwise `None`
/// (the selector's default entry).
pub fn effective_category(category: Option<Uuid>, taxonomy: &Taxonomy) -> Option<Uuid> {
    match category {
        Some(id) if taxonomy.graph.contains(id) => Some(id),
        Some(id) => {
            warn!("Category {id} no longer present; falling back to no category");
            None
        }
        None => None,
    }
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, words: impl IntoIterator<Item = String>) {
    for w in words {
        if seen.insert(w.clone()) {
            out.push(w);
        }
    }
}

/// Words offered by the word picker. With a category: its vocabulary plus
/// the words already selected, so a selection never disappears. Otherwise
/// (or for a category without vocabulary): every corpus word plus every
/// taxonomy term.
pub fn word_options(state: &DashboardState, data: &DashboardData) -> Vec<String> {
    let category = effective_category(state.category, &data.taxonomy);
    let vocabulary = match category {
        Some(id) => data.taxonomy.graph.vocabulary_of(Some(id)),
        None => Vec::new(),
    };
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    if vocabulary.is_empty() {
        push_unique(&mut out, &mut seen, data.unigrams.distinct_words());
        push_unique(&mut out, &mut seen, data.taxonomy.graph.vocabulary_of(None));
    } else {
        push_unique(&mut out, &mut seen, vocabulary);
        push_unique(&mut out, &mut seen, state.explored_words());
    }
    out
}

/// Options for the extra collocation words: the word options minus the
/// explored words, keeping extra words already chosen.
pub fn collocation_word_options(state: &DashboardState, data: &DashboardData) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen: HashSet<String> = state.explored_words().into_iter().collect();
    push_unique(&mut out, &mut seen, word_options(state, data));
    push_unique(&mut out, &mut seen, normalized(&state.collocation.extra_words));
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A rendered collocation network and the artifact name it is saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkPanel {
    pub caption: String,
    pub artifact: String,
    pub rendered: Rendered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Text(String),
    Error(String),
    Info(String),
    Help(Vec<String>),
    Chart { id: String, spec: Value },
    Network(NetworkPanel),
    Table(Table),
    Columns(Vec<Vec<Block>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub summary: Vec<String>,
    pub word_options: Vec<String>,
    pub categories: Vec<(Uuid, String)>,
    pub blocks: Vec<Block>,
}

impl Page {
    /// Errors and notices, for surfacing outside the HTML page.
    pub fn messages(&self) -> Vec<&str> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
            for b in blocks {
                match b {
                    Block::Error(m) | Block::Info(m) => out.push(m),
                    Block::Columns(cols) => cols.iter().for_each(|c| walk(c, out)),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    pub fn has_error(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::Error(_)))
    }

    pub fn networks(&self) -> Vec<&NetworkPanel> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a NetworkPanel>) {
            for b in blocks {
                match b {
                    Block::Network(n) => out.push(n),
                    Block::Columns(cols) => cols.iter().for_each(|c| walk(c, out)),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    pub fn charts(&self) -> Vec<&Value> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Chart { spec, .. } => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Complete HTML page. Interactive networks are framed from their saved
    /// artifacts, static figures are inlined.
    pub fn to_html(&self) -> String {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        for line in &self.summary {
            body.push_str(&format!("<p class=\"summary\">{}</p>\n", escape_html(line)));
        }
        let mut scripts = String::new();
        blocks_html(&self.blocks, &mut body, &mut scripts);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.columns {{ display: flex; gap: 1rem; }}
.columns > div {{ flex: 1; }}
.error {{ color: #9b1c1c; background: #fde8e8; padding: .75rem; }}
.info {{ color: #1e429f; background: #e1effe; padding: .75rem; }}
table {{ border-collapse: collapse; font-size: .85rem; }}
td, th {{ border: 1px solid #ddd; padding: 2px 6px; }}
</style>
</head>
<body>
{body}<script>
{scripts}</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
        )
    }
}

fn blocks_html(blocks: &[Block], body: &mut String, scripts: &mut String) {
    for block in blocks {
        match block {
            Block::Heading(h) => body.push_str(&format!("<h2>{}</h2>\n", escape_html(h))),
            Block::Text(t) => body.push_str(&format!("<p>{}</p>\n", escape_html(t))),
            Block::Error(t) => body.push_str(&format!("<div class=\"error\">{}</div>\n", escape_html(t))),
            Block::Info(t) => body.push_str(&format!("<div class=\"info\">{}</div>\n", escape_html(t))),
            Block::Help(paragraphs) => {
                body.push_str("<details open><summary>Help</summary>\n");
                for p in paragraphs {
                    body.push_str(&format!("<p>{}</p>\n", escape_html(p)));
                }
                body.push_str("</details>\n");
            }
            Block::Chart { id, spec } => {
                body.push_str(&format!("<div id=\"{}\"></div>\n", escape_html(id)));
                let spec = escape_script_json(&spec.to_string());
                scripts.push_str(&format!("vegaEmbed('#{id}', {spec});\n"));
            }
            Block::Network(panel) => {
                body.push_str(&format!("<p>{}</p>\n", escape_html(&panel.caption)));
                match &panel.rendered {
                    Rendered::Html { frame_height, .. } => body.push_str(&format!(
                        "<iframe src=\"{}.html\" width=\"100%\" height=\"{frame_height}\" frameborder=\"0\"></iframe>\n",
                        escape_html(&panel.artifact)
                    )),
                    Rendered::Svg(svg) => {
                        body.push_str(svg);
                        body.push('\n');
                    }
                }
            }
            Block::Table(table) => {
                body.push_str(&format!("<details><summary>{}</summary>\n<table>\n<tr>", escape_html(&table.title)));
                for h in &table.headers {
                    body.push_str(&format!("<th>{}</th>", escape_html(h)));
                }
                body.push_str("</tr>\n");
                for row in &table.rows {
                    body.push_str("<tr>");
                    for cell in row {
                        body.push_str(&format!("<td>{}</td>", escape_html(cell)));
                    }
                    body.push_str("</tr>\n");
                }
                body.push_str("</table>\n</details>\n");
            }
            Block::Columns(cols) => {
                body.push_str("<div class=\"columns\">\n");
                for col in cols {
                    body.push_str("<div>\n");
                    blocks_html(col, body, scripts);
                    body.push_str("</div>\n");
                }
                body.push_str("</div>\n");
            }
        }
    }
}

fn edge_table(title: &str, graph: &CollocationGraph) -> Table {
    Table {
        title: title.to_string(),
        headers: vec![
            "source".to_string(),
            "target".to_string(),
            graph.metric().column().to_string(),
        ],
        rows: graph
            .edges()
            .into_iter()
            .map(|e| vec![e.source, e.target, e.weight.to_string()])
            .collect(),
    }
}

fn frequency_section(state: &DashboardState, data: &DashboardData) -> Vec<Block> {
    let settings = &state.frequency;
    let heading = if settings.timeline {
        "Word frequencies and timeline"
    } else {
        "Word frequencies"
    };
    let mut blocks = vec![Block::Heading(heading.to_string())];
    let words = state.explored_words();
    if words.is_empty() {
        blocks.push(Block::Info(NO_WORDS_SELECTED.to_string()));
        return blocks;
    }

    let series = select_series(data.unigrams.select(state.subset), &words, &state.range);
    let events = timeline_events(&data.timeline, &state.range);
    let options = FrequencyChartOptions {
        point_chart: settings.point_chart,
        timeline: settings.timeline,
    };
    blocks.push(Block::Chart {
        id: "word-frequencies".to_string(),
        spec: frequency_chart_spec(&series, &events, &state.range, options),
    });

    if settings.show_data {
        let unigram_table = Table {
            title: "Word frequencies source data".to_string(),
            headers: vec!["date".into(), "word".into(), "frequency".into()],
            rows: series
                .iter()
                .map(|u| vec![u.date.to_string(), u.word.clone(), u.frequency.to_string()])
                .collect(),
        };
        let totals_table = Table {
            title: "Word frequency totals".to_string(),
            headers: vec!["word".into(), "total".into()],
            rows: word_totals(&series)
                .into_iter()
                .map(|(word, total)| vec![word, total.to_string()])
                .collect(),
        };
        if settings.timeline {
            let timeline_table = Table {
                title: "Timeline source data".to_string(),
                headers: vec!["date".into(), "description".into()],
                rows: events
                    .iter()
                    .map(|e| vec![e.date.to_string(), e.description.clone()])
                    .collect(),
            };
            blocks.push(Block::Columns(vec![
                vec![Block::Table(unigram_table), Block::Table(totals_table)],
                vec![Block::Table(timeline_table)],
            ]));
        } else {
            blocks.push(Block::Table(unigram_table));
            blocks.push(Block::Table(totals_table));
        }
    }
    if settings.show_help {
        blocks.push(Block::Help(FREQUENCY_HELP.iter().map(|s| s.to_string()).collect()));
    }
    blocks
}

fn collocation_section(
    state: &DashboardState,
    data: &DashboardData,
    pipeline: RenderPipeline,
    style: &NetworkStyle,
) -> Result<Vec<Block>> {
    let settings = &state.collocation;
    let mut blocks = vec![Block::Heading(format!(
        "Word collocations by {}",
        settings.metric.label()
    ))];
    if state.explored_words().is_empty() {
        blocks.push(Block::Info(NO_WORDS_TO_COLLOCATE.to_string()));
        return Ok(blocks);
    }

    let focus = state.focus_words();
    let mut panes = Vec::new();
    let subsets = std::iter::once((state.subset, "collocations"))
        .chain(settings.compare.map(|s| (s, "collocations_cf")));
    for (subset, artifact) in subsets {
        let bigrams = filter_dates(data.bigrams.select(subset), &state.range);
        let graph = build_collocation_graph(&bigrams, &focus, settings.metric, settings.top_k);
        let rendered = render(&graph, &focus, pipeline, style)?;
        debug!("Rendered {artifact} for {subset}");
        panes.push((subset, graph, rendered, artifact));
    }

    let caption = |s: Subset| format!("Collocations in {}", s.label());
    if panes.len() == 1 {
        let (subset, graph, rendered, artifact) = panes.remove(0);
        blocks.push(Block::Network(NetworkPanel {
            caption: caption(subset),
            artifact: artifact.to_string(),
            rendered,
        }));
        if settings.show_data {
            blocks.push(Block::Table(edge_table("Word collocations source data", &graph)));
        }
    } else {
        let mut network_cols = Vec::new();
        let mut data_cols = Vec::new();
        for (subset, graph, rendered, artifact) in panes {
            network_cols.push(vec![Block::Network(NetworkPanel {
                caption: caption(subset),
                artifact: artifact.to_string(),
                rendered,
            })]);
            data_cols.push(vec![Block::Table(edge_table(
                &format!("Word collocations source data: {}", subset.label()),
                &graph,
            ))]);
        }
        blocks.push(Block::Columns(network_cols));
        if settings.show_data {
            blocks.push(Block::Columns(data_cols));
        }
    }
    if settings.show_help {
        blocks.push(Block::Help(COLLOCATION_HELP.iter().map(|s| s.to_string()).collect()));
    }
    Ok(blocks)
}

/// Builds the explorer page for one settings snapshot. An inverted date
/// range yields a page with the error and no charts.
pub fn render_dashboard(
    state: &DashboardState,
    data: &DashboardData,
    pipeline: RenderPipeline,
    style: &NetworkStyle,
) -> Result<Page> {
    let mut page = Page {
        title: "Dashboard: Tweets Explorer".to_string(),
        summary: vec![
            format!("Selected tweets: {}", state.subset.label()),
            format!("Selected date range: {}", state.range.describe()),
        ],
        word_options: Vec::new(),
        categories: data.taxonomy.categories.clone(),
        blocks: Vec::new(),
    };
    if !state.range.is_valid() {
        page.blocks.push(Block::Error(DATE_RANGE_ERROR.to_string()));
        return Ok(page);
    }

    page.word_options = word_options(state, data);
    if state.frequency.show_chart {
        page.blocks.extend(frequency_section(state, data));
    }
    if state.collocation.show_chart {
        page.blocks.extend(collocation_section(state, data, pipeline, style)?);
    }
    Ok(page)
}

/// The "about the data" page: headline totals, then one per-day bar chart
/// per statistic. An inverted date range yields only the error.
pub fn render_about(summary: &CorpusSummary, range: &DateRange) -> Page {
    let mut page = Page {
        title: "About the data".to_string(),
        summary: vec![format!("Selected date range: {}", range.describe())],
        word_options: Vec::new(),
        categories: Vec::new(),
        blocks: Vec::new(),
    };
    if !range.is_valid() {
        page.blocks.push(Block::Error(DATE_RANGE_ERROR.to_string()));
        return page;
    }

    page.blocks.push(Block::Table(Table {
        title: "Overview".to_string(),
        headers: vec!["".into(), "count".into()],
        rows: summary
            .headline_rows()
            .into_iter()
            .map(|(label, count)| vec![label, count])
            .collect(),
    }));
    for chart in &DAILY_CHARTS {
        let days = summary
            .daily_of(chart.column)
            .map(|s| s.days.as_slice())
            .unwrap_or(&[]);
        page.blocks.push(Block::Heading(chart.heading.to_string()));
        if let Some(note) = chart.note {
            page.blocks.push(Block::Text(note.to_string()));
        }
        page.blocks.push(Block::Chart {
            id: format!("daily-{}", chart.column),
            spec: daily_chart_spec(chart, days, range),
        });
    }
    page
}

/// Saves every network artifact, then the page itself as `file_name`, into
/// the session's artifact directory. Returns the page path.
pub fn publish_as(page: &Page, store: &ArtifactStore, file_name: &str) -> Result<PathBuf> {
    for panel in page.networks() {
        store.write_rendered(&panel.artifact, &panel.rendered)?;
    }
    store.write(file_name, &page.to_html())
}

/// [`publish_as`] under `dashboard.html`.
pub fn publish(page: &Page, store: &ArtifactStore) -> Result<PathBuf> {
    publish_as(page, store, "dashboard.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Bigram, SubsetTable, TimelineEvent, Unigram};
    use crate::taxonomy::{Taxonomy, parse_taxonomy};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, day).unwrap()
    }

    fn bigram(day: u32, x: &str, y: &str, f: f64, pmi: f64) -> Bigram {
        Bigram { date: d(day), word_x: x.into(), word_y: y.into(), frequency: f, pmi }
    }

    fn data() -> DashboardData {
        let unigrams = BTreeMap::from([
            (
                Subset::All,
                vec![
                    Unigram { date: d(13), word: "truth".into(), frequency: 3.0 },
                    Unigram { date: d(14), word: "hoax".into(), frequency: 2.0 },
                ],
            ),
            (Subset::Cures, vec![Unigram { date: d(13), word: "bleach".into(), frequency: 1.0 }]),
        ]);
        let bigrams = BTreeMap::from([
            (
                Subset::All,
                vec![
                    bigram(13, "truth", "hoax", 5.0, 1.2),
                    bigram(13, "hoax", "lies", 9.0, 0.4),
                ],
            ),
            (Subset::Cures, vec![bigram(13, "bleach", "truth", 2.0, 3.0)]),
        ]);
        let raw = parse_taxonomy(
            "category: Cures\nvocabulary: [Bleach, Ivermectin]\nsubcategories:\n  - category: Empty\n",
            Path::new("cures.yaml"),
        )
        .unwrap();
        DashboardData {
            unigrams: Arc::new(SubsetTable::from_rows(unigrams)),
            bigrams: Arc::new(SubsetTable::from_rows(bigrams)),
            timeline: Arc::new(vec![TimelineEvent {
                date: d(14),
                description: "An event".into(),
                summary: "Event".into(),
                position: Some(1.0),
            }]),
            taxonomy: Arc::new(Taxonomy::from_raw(&raw)),
        }
    }

    fn state() -> DashboardState {
        let mut s = DashboardState::new(DateRange::new(d(1), d(30)));
        s.words = vec!["truth".into()];
        s
    }

    #[test]
    fn inverted_range_short_circuits() {
        let mut s = state();
        s.range = DateRange::new(d(20), d(10));
        s.collocation.show_chart = true;
        let page = render_dashboard(&s, &data(), RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();
        assert!(page.has_error());
        assert_eq!(page.messages(), vec![DATE_RANGE_ERROR]);
        assert!(page.charts().is_empty());
        assert!(page.networks().is_empty());
    }

    #[test]
    fn comparison_renders_two_networks_with_same_style() {
        let mut s = state();
        s.frequency.show_chart = false;
        s.collocation.show_chart = true;
        s.collocation.compare = Some(Subset::Cures);
        s.collocation.show_data = true;
        let page = render_dashboard(&s, &data(), RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();
        let nets = page.networks();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].caption, "Collocations in All");
        assert_eq!(nets[1].caption, "Collocations in Cures");
        assert_eq!(nets[1].artifact, "collocations_cf");
        for n in &nets {
            assert!(n.rendered.contents().contains("rgba(214,67,137,1)"));
        }
        assert!(nets[1].rendered.contents().contains("bleach"));
    }

    #[test]
    fn no_words_means_info_not_chart() {
        let mut s = state();
        s.words.clear();
        s.collocation.show_chart = true;
        let page = render_dashboard(&s, &data(), RenderPipeline::Static, &NetworkStyle::default())
            .unwrap();
        assert_eq!(page.messages(), vec![NO_WORDS_SELECTED, NO_WORDS_TO_COLLOCATE]);
        assert!(page.charts().is_empty());
    }

    #[test]
    fn extra_collocation_words_join_focus_set() {
        let mut s = state();
        s.words = vec!["Truth".into()];
        s.collocation.extra_words = vec!["lies".into(), " ".into()];
        let focus: Vec<String> = s.focus_words().into_iter().collect();
        assert_eq!(focus, vec!["lies", "truth"]);
    }

    #[test]
    fn word_options_follow_category() {
        let data = data();
        let mut s = state();
        let all = word_options(&s, &data);
        assert_eq!(all, vec!["truth", "hoax", "bleach", "ivermectin"]);

        s.category = data.taxonomy.resolve_category("Cures");
        assert_eq!(word_options(&s, &data), vec!["bleach", "ivermectin", "truth"]);

        // A category without vocabulary suggests everything.
        s.category = data.taxonomy.resolve_category("Cures > Empty");
        assert_eq!(word_options(&s, &data), all);

        // A stale id falls back to the default.
        s.category = Some(Uuid::new_v4());
        assert_eq!(word_options(&s, &data), all);
        assert_eq!(effective_category(s.category, &data.taxonomy), None);
    }

    #[test]
    fn collocation_options_exclude_explored_words() {
        let data = data();
        let mut s = state();
        s.collocation.extra_words = vec!["zzz".into()];
        let options = collocation_word_options(&s, &data);
        assert!(!options.contains(&"truth".to_string()));
        assert!(options.contains(&"zzz".to_string()));
    }

    #[test]
    fn page_html_embeds_charts_and_frames() {
        let mut s = state();
        s.collocation.show_chart = true;
        s.frequency.timeline = true;
        s.frequency.show_data = true;
        let page = render_dashboard(&s, &data(), RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();
        let html = page.to_html();
        assert!(html.contains("vegaEmbed('#word-frequencies'"));
        assert!(html.contains("<iframe src=\"collocations.html\""));
        assert!(html.contains("height=\"824\""));
        assert!(html.contains("Timeline source data"));
    }

    #[test]
    fn publish_writes_artifacts_into_session_dir() {
        let base = tempfile::tempdir().unwrap();
        let store = ArtifactStore::create(base.path()).unwrap();
        let mut s = state();
        s.collocation.show_chart = true;
        s.collocation.compare = Some(Subset::Cures);
        let page = render_dashboard(&s, &data(), RenderPipeline::Static, &NetworkStyle::default())
            .unwrap();
        let path = publish(&page, &store).unwrap();
        assert!(path.ends_with("dashboard.html"));
        assert!(store.path("collocations.svg").exists());
        assert!(store.path("collocations_cf.svg").exists());
    }

    #[test]
    fn markup_in_data_cannot_break_out_of_scripts() {
        let mut data = data();
        data.timeline = Arc::new(vec![TimelineEvent {
            date: d(14),
            description: "x</script><h1>INJECTED</h1>".into(),
            summary: "</script>".into(),
            position: None,
        }]);
        data.bigrams = Arc::new(SubsetTable::from_rows(BTreeMap::from([(
            Subset::All,
            vec![bigram(13, "truth", "</script><img>", 5.0, 1.2)],
        )])));
        let mut s = state();
        s.frequency.timeline = true;
        s.frequency.show_data = true;
        s.collocation.show_chart = true;
        let page = render_dashboard(&s, &data, RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();

        let html = page.to_html();
        // Three library includes plus the inline block.
        assert_eq!(html.matches("</script>").count(), 4);
        assert!(!html.contains("<h1>INJECTED"));
        assert!(html.contains("x&lt;/script&gt;&lt;h1&gt;INJECTED"));

        let network = page.networks()[0].rendered.contents();
        assert_eq!(network.matches("</script>").count(), 2);
        assert!(!network.contains("<img>"));
    }

    #[test]
    fn selection_is_normalized_for_every_section() {
        let mut s = state();
        s.words = vec![" Truth ".into(), "truth".into(), "".into()];
        s.frequency.show_data = true;
        s.collocation.show_chart = true;
        assert_eq!(s.explored_words(), vec!["truth"]);

        let page = render_dashboard(&s, &data(), RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();
        let series = &page.charts()[0]["hconcat"][0]["data"]["values"];
        assert_eq!(series.as_array().unwrap().len(), 1);
        assert_eq!(series[0]["word"], "truth");
        assert!(page.networks()[0].rendered.contents().contains(r#""id":"hoax""#));
    }

    #[test]
    fn frequency_data_lists_word_totals() {
        let mut s = state();
        s.words = vec!["truth".into(), "hoax".into()];
        s.frequency.show_data = true;
        let page = render_dashboard(&s, &data(), RenderPipeline::Interactive, &NetworkStyle::default())
            .unwrap();
        let totals = page
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) if t.title == "Word frequency totals" => Some(t),
                _ => None,
            })
            .expect("totals table");
        assert_eq!(totals.rows, vec![vec!["truth", "3"], vec!["hoax", "2"]]);
    }

    fn summary() -> CorpusSummary {
        CorpusSummary {
            tweets: 1500,
            retweeted: 10,
            favourited: 20,
            replied: 30,
            quoted: 40,
            new_users: 7,
            daily: vec![crate::stats::DailySeries {
                column: "tweet_count".into(),
                days: vec![(d(13), 1200), (d(14), 300)],
            }],
        }
    }

    #[test]
    fn about_page_has_one_chart_per_statistic() {
        let range = DateRange::new(d(13), d(14));
        let page = render_about(&summary(), &range);
        let charts = page.charts();
        assert_eq!(charts.len(), 6);
        assert_eq!(charts[0]["title"], "Tweets per day");
        assert_eq!(charts[0]["data"]["values"].as_array().unwrap().len(), 2);
        // Missing series render as empty charts.
        assert!(charts[5]["data"]["values"].as_array().unwrap().is_empty());
        let html = page.to_html();
        assert_eq!(html.matches("vegaEmbed('#daily-").count(), 6);
        assert!(html.contains("1,500"));
    }

    #[test]
    fn about_page_inverted_range() {
        let page = render_about(&summary(), &DateRange::new(d(14), d(13)));
        assert_eq!(page.messages(), vec![DATE_RANGE_ERROR]);
        assert!(page.charts().is_empty());
    }
}
