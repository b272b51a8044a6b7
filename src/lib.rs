#![forbid(unsafe_code)]
//! # Corpus Explorer
//!
//! Library behind the `corpus-explorer` CLI: an analytics dashboard over a
//! tweet corpus partitioned into topic subsets.
//!
//! The pipeline, end to end:
//!
//! 1. [`config::DataSources`] names the per-subset unigram and bigram tables,
//!    the timeline and the topic taxonomies.
//! 2. [`data::DataStore`] loads them (gzipped CSV, YAML) once and keeps them
//!    as shared snapshots for an hour.
//! 3. [`dashboard::render_dashboard`] turns a [`dashboard::DashboardState`]
//!    into a [`dashboard::Page`]: word-frequency charts (Vega-Lite) and
//!    collocation networks built by [`collocation`] and drawn by [`render`],
//!    either as an interactive vis-network page or a static SVG figure.
//! 4. [`dashboard::publish`] writes the page and its network artifacts into a
//!    per-session directory.
//!
//! The `about` report ([`stats`], [`dashboard::render_about`]) summarizes
//! daily tweet, engagement and user counts and charts each one per day.
//!
//! ## Example
//! ```no_run
//! use corpus_explorer::{DashboardState, DataSources, DataStore, RenderPipeline};
//! use corpus_explorer::render::{ArtifactStore, NetworkStyle};
//!
//! let mut store = DataStore::new(DataSources::from_root("data"));
//! let data = store.snapshot()?;
//! let range = data.unigrams.date_span().expect("corpus has rows");
//! let mut state = DashboardState::new(range);
//! state.collocation.show_chart = true;
//! let page = corpus_explorer::render_dashboard(
//!     &state,
//!     &data,
//!     RenderPipeline::Interactive,
//!     &NetworkStyle::default(),
//! )?;
//! let out = ArtifactStore::create("output")?;
//! corpus_explorer::publish(&page, &out)?;
//! # Ok::<(), corpus_explorer::ExplorerError>(())
//! ```

pub mod cache;
pub mod collocation;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod frequency;
pub mod render;
pub mod stats;
pub mod table;
pub mod taxonomy;

pub use collocation::{Collocate, CollocationGraph, build_collocation_graph, select_collocates};
pub use config::{DataSources, DateRange, Metric, RenderPipeline, Subset};
pub use dashboard::{DashboardState, Page, publish, publish_as, render_about, render_dashboard};
pub use data::{DashboardData, DataStore};
pub use error::{ExplorerError, Result};
pub use stats::CorpusSummary;
pub use taxonomy::Taxonomy;
