//! Session data: every table and taxonomy the dashboard reads, loaded once
//! and held as immutable snapshots for the cache lifetime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;

use crate::cache::{DEFAULT_TTL, TtlCache};
use crate::config::DataSources;
use crate::error::{ExplorerError, Result};
use crate::stats::DailyStats;
use crate::table::{Bigram, SubsetTable, TimelineEvent, Unigram, assign_positions, load_table};
use crate::taxonomy::Taxonomy;

/// Read-only view of the loaded corpus, handed to the dashboard renderer.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub unigrams: Arc<SubsetTable<Unigram>>,
    pub bigrams: Arc<SubsetTable<Bigram>>,
    pub timeline: Arc<Vec<TimelineEvent>>,
    pub taxonomy: Arc<Taxonomy>,
}

/// The three daily statistics tables of the "about" report.
#[derive(Debug, Clone)]
pub struct StatsData {
    pub tweets: DailyStats,
    pub retweets: DailyStats,
    pub users: DailyStats,
}

#[derive(Debug)]
pub struct DataStore {
    sources: DataSources,
    unigrams: TtlCache<SubsetTable<Unigram>>,
    bigrams: TtlCache<SubsetTable<Bigram>>,
    timeline: TtlCache<Vec<TimelineEvent>>,
    taxonomy: TtlCache<Taxonomy>,
    stats: TtlCache<StatsData>,
}

impl DataStore {
    pub fn new(sources: DataSources) -> Self {
        DataStore::with_ttl(sources, DEFAULT_TTL)
    }

    pub fn with_ttl(sources: DataSources, ttl: Duration) -> Self {
        DataStore {
            sources,
            unigrams: TtlCache::new(ttl),
            bigrams: TtlCache::new(ttl),
            timeline: TtlCache::new(ttl),
            taxonomy: TtlCache::new(ttl),
            stats: TtlCache::new(ttl),
        }
    }

    pub fn sources(&self) -> &DataSources {
        &self.sources
    }

    /// Loads (or reuses) everything the explorer needs.
    pub fn snapshot(&mut self) -> Result<DashboardData> {
        let start = Instant::now();
        let sources = &self.sources;
        let unigrams = self
            .unigrams
            .get_or_try_load(|| SubsetTable::load(&sources.unigrams))?;
        let bigrams = self
            .bigrams
            .get_or_try_load(|| SubsetTable::load(&sources.bigrams))?;
        let timeline = self.timeline.get_or_try_load(|| {
            let mut events: Vec<TimelineEvent> = load_table(&sources.timeline)?;
            assign_positions(&mut events);
            Ok::<_, ExplorerError>(events)
        })?;
        let taxonomy = self
            .taxonomy
            .get_or_try_load(|| Taxonomy::load(&sources.taxonomies))?;
        info!("Data cached! (took {:.2}s to load)", start.elapsed().as_secs_f64());
        Ok(DashboardData {
            unigrams,
            bigrams,
            timeline,
            taxonomy,
        })
    }

    /// Loads (or reuses) the daily statistics. Errors if the sources name no
    /// statistics files.
    pub fn stats(&mut self) -> Result<Arc<StatsData>> {
        let Some(paths) = self.sources.stats.clone() else {
            return Err(ExplorerError::MissingSource("statistics files"));
        };
        self.stats.get_or_try_load(|| {
            Ok(StatsData {
                tweets: DailyStats::load(&paths.tweets)?,
                retweets: DailyStats::load(&paths.retweets)?,
                users: DailyStats::load(&paths.users)?,
            })
        })
    }
}
