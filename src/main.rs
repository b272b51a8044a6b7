#![forbid(unsafe_code)]
//! # Corpus Explorer CLI
//!
//! Command-line front end of the `corpus_explorer` crate.
//!
//! - `explore` renders the tweets dashboard (word frequencies, timeline,
//!   collocation networks) for one set of selections and writes it, with its
//!   network artifacts, into a fresh session directory under `--output`.
//! - `about` prints the headline numbers of the corpus for a date range and
//!   writes the "About the data" report with one daily chart per statistic.
//!
//! ## Example
//! ```bash
//! corpus-explorer explore --data data --subset vaccines --collocations \
//!     --words vaccine,chip --compare conspiracy --renderer static
//! ```
//!
//! Set `RUST_LOG=info` to see load timings and written files.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{error, info};

use corpus_explorer::dashboard::{DEFAULT_WORDS, DashboardState, publish_as, render_about};
use corpus_explorer::render::{ArtifactStore, NetworkStyle};
use corpus_explorer::{
    CorpusSummary, DataSources, DataStore, DateRange, ExplorerError, Metric, RenderPipeline,
    Subset, config::parse_compare, publish, render_dashboard,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the tweets explorer dashboard
    Explore(ExploreArgs),
    /// Summarize tweets, engagement and new users for a date range
    About(AboutArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Data root with the standard layout (<SUBSET>/unigrams.csv.gz, ...)
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// JSON manifest naming every input file; overrides --data
    #[arg(long)]
    sources: Option<PathBuf>,

    /// First day of the date range (YYYY-MM-DD); defaults to the earliest day
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD); defaults to the latest day
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl SourceArgs {
    fn data_sources(&self) -> Result<DataSources, ExplorerError> {
        match &self.sources {
            Some(manifest) => DataSources::from_manifest(manifest),
            None => Ok(DataSources::from_root(&self.data)),
        }
    }

    fn range(&self, span: Option<DateRange>) -> Option<DateRange> {
        let start = self.from.or(span.map(|s| s.start))?;
        let end = self.to.or(span.map(|s| s.end))?;
        Some(DateRange::new(start, end))
    }
}

#[derive(Args)]
struct ExploreArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Tweet subset to explore
    #[arg(long, value_enum, default_value_t = Subset::All)]
    subset: Subset,

    /// Comma-separated words to explore
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_WORDS)]
    words: Vec<String>,

    /// Taxonomy category whose vocabulary is suggested (e.g. "Vaccines > Side effects")
    #[arg(long)]
    category: Option<String>,

    /// Hide the word frequencies chart
    #[arg(long, default_value_t = false)]
    no_frequency_chart: bool,

    /// Draw frequencies as points instead of lines
    #[arg(long, default_value_t = false)]
    point_chart: bool,

    /// Add the timeline of events under the frequencies chart
    #[arg(long, default_value_t = false)]
    timeline: bool,

    /// Include the frequency (and timeline) source data
    #[arg(long, default_value_t = false)]
    frequency_data: bool,

    /// Include help for the frequency charts
    #[arg(long, default_value_t = false)]
    frequency_help: bool,

    /// Show word collocation networks
    #[arg(long, default_value_t = false)]
    collocations: bool,

    /// Statistic ranking collocates and weighting edges
    #[arg(long, value_enum, default_value_t = Metric::Pmi)]
    metric: Metric,

    /// Collocates kept per word (1-10)
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(1..=10))]
    collocates: u8,

    /// Subset to compare collocations with, or "none"
    #[arg(long, default_value = "none")]
    compare: String,

    /// Comma-separated extra words to collocate
    #[arg(long, value_delimiter = ',')]
    collocate_with: Vec<String>,

    /// Include the collocation edge lists
    #[arg(long, default_value_t = false)]
    collocation_data: bool,

    /// Include help for the collocation networks
    #[arg(long, default_value_t = false)]
    collocation_help: bool,

    /// Network renderer
    #[arg(long, value_enum, default_value_t = RenderPipeline::Interactive)]
    renderer: RenderPipeline,

    /// Directory receiving one sub-directory per session
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

#[derive(Args)]
struct AboutArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Directory receiving one sub-directory per session
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn clean_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn explore(args: &ExploreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let compare = parse_compare(&args.compare)?;
    let mut store = DataStore::new(args.source.data_sources()?);
    let data = store.snapshot()?;
    let range = args
        .source
        .range(data.unigrams.date_span())
        .ok_or("no dates to default the range to; pass --from and --to")?;

    let mut state = DashboardState::new(range);
    state.subset = args.subset;
    state.words = clean_words(&args.words);
    state.category = args
        .category
        .as_deref()
        .and_then(|label| data.taxonomy.resolve_category(label));
    state.frequency.show_chart = !args.no_frequency_chart;
    state.frequency.point_chart = args.point_chart;
    state.frequency.timeline = args.timeline;
    state.frequency.show_data = args.frequency_data;
    state.frequency.show_help = args.frequency_help;
    state.collocation.show_chart = args.collocations;
    state.collocation.metric = args.metric;
    state.collocation.top_k = usize::from(args.collocates);
    state.collocation.compare = compare;
    state.collocation.extra_words = clean_words(&args.collocate_with);
    state.collocation.show_data = args.collocation_data;
    state.collocation.show_help = args.collocation_help;

    let page = render_dashboard(&state, &data, args.renderer, &NetworkStyle::default())?;
    let artifacts = ArtifactStore::create(&args.output)?;
    info!("Session {}", artifacts.session());
    let path = publish(&page, &artifacts)?;
    for message in page.messages() {
        println!("{message}");
    }
    println!("{}", path.display());
    Ok(())
}

fn about(args: &AboutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = DataStore::new(args.source.data_sources()?);
    let stats = store.stats()?;
    let range = args
        .source
        .range(stats.tweets.span())
        .ok_or("no dates to default the range to; pass --from and --to")?;
    if !range.is_valid() {
        return Err(corpus_explorer::dashboard::DATE_RANGE_ERROR.into());
    }
    let summary = CorpusSummary::compute(&stats.tweets, &stats.retweets, &stats.users, &range);

    let page = render_about(&summary, &range);
    let artifacts = ArtifactStore::create(&args.output)?;
    info!("Session {}", artifacts.session());
    let path = publish_as(&page, &artifacts, "about.html")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.to_text(&range));
        println!("{}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Command::Explore(args) => explore(args),
        Command::About(args) => about(args),
    };
    if let Err(e) = outcome {
        error!("Error: {}", e);
        process::exit(1);
    }
}
