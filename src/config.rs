//! Dashboard configuration surface: subset keys, collocation metric, date
//! range, renderer choice and the on-disk layout of the corpus data.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::table::Bigram;

/// Topic subsets of the tweet corpus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    All,
    Conspiracy,
    Cures,
    Origins,
    Vaccines,
}

impl Subset {
    pub const ALL: [Subset; 5] = [
        Subset::All,
        Subset::Conspiracy,
        Subset::Cures,
        Subset::Origins,
        Subset::Vaccines,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subset::All => "all",
            Subset::Conspiracy => "conspiracy",
            Subset::Cures => "cures",
            Subset::Origins => "origins",
            Subset::Vaccines => "vaccines",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subset::All => "All",
            Subset::Conspiracy => "Conspiracy",
            Subset::Cures => "Cures",
            Subset::Origins => "Origins",
            Subset::Vaccines => "Vaccines",
        }
    }

    /// Only the topical subsets ship a taxonomy; "all" is their union.
    pub fn has_taxonomy(self) -> bool {
        self != Subset::All
    }

    pub fn from_key(key: &str) -> Option<Subset> {
        Subset::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses the "compare to" selector, where `none` switches comparison off.
pub fn parse_compare(value: &str) -> std::result::Result<Option<Subset>, String> {
    let key = value.trim().to_lowercase();
    if key == "none" {
        return Ok(None);
    }
    Subset::from_key(&key).map(Some).ok_or_else(|| {
        let keys: Vec<&str> = Subset::ALL.iter().map(|s| s.key()).collect();
        format!("unknown subset {value:?}; expected none, {}", keys.join(", "))
    })
}

/// Statistic used to rank and weight collocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Raw bigram frequency (`f_xy`)
    Frequency,
    /// Pointwise mutual information
    Pmi,
}

impl Metric {
    /// Column name of the metric in the bigram files.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Frequency => "f_xy",
            Metric::Pmi => "pmi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Frequency => "Frequency",
            Metric::Pmi => "Pointwise Mutual Information (PMI)",
        }
    }

    pub fn value_of(self, bigram: &Bigram) -> f64 {
        match self {
            Metric::Frequency => bigram.frequency,
            Metric::Pmi => bigram.pmi,
        }
    }
}

/// Which network renderer the dashboard uses. Fixed per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RenderPipeline {
    /// Self-contained HTML document with a physics-driven network canvas
    #[default]
    Interactive,
    /// Spring layout drawn into an SVG figure
    Static,
}

/// Inclusive date range. Deliberately not validated on construction: an
/// inverted range is a user-visible state the dashboard must report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Smallest range covering every date, `None` for an empty iterator.
    pub fn spanning<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Option<Self> {
        dates.into_iter().fold(None, |acc, d| match acc {
            None => Some(DateRange::new(d, d)),
            Some(r) => Some(DateRange::new(r.start.min(d), r.end.max(d))),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn describe(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%d %B %Y"),
            self.end.format("%d %B %Y")
        )
    }
}

/// Paths of the three daily statistics files behind the "about" report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSources {
    pub tweets: PathBuf,
    pub retweets: PathBuf,
    pub users: PathBuf,
}

/// Where the corpus files live. Built from a data root with the standard
/// layout, or read from a JSON manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    pub unigrams: BTreeMap<Subset, PathBuf>,
    pub bigrams: BTreeMap<Subset, PathBuf>,
    pub timeline: PathBuf,
    #[serde(default)]
    pub taxonomies: BTreeMap<Subset, PathBuf>,
    #[serde(default)]
    pub stats: Option<StatsSources>,
}

impl DataSources {
    /// Standard layout: `<ROOT>/<SUBSET>/{unigrams,bigrams}.csv.gz`,
    /// `timeline/covid-events.csv`, `taxonomies/<subset>.yaml`, `stats/*.csv`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let per_subset = |file: &str| {
            Subset::ALL
                .into_iter()
                .map(|s| (s, root.join(s.key().to_uppercase()).join(file)))
                .collect::<BTreeMap<_, _>>()
        };
        let taxonomies = Subset::ALL
            .into_iter()
            .filter(|s| s.has_taxonomy())
            .map(|s| (s, root.join("taxonomies").join(format!("{}.yaml", s.key()))))
            .collect();
        let stats = root.join("stats");

        DataSources {
            unigrams: per_subset("unigrams.csv.gz"),
            bigrams: per_subset("bigrams.csv.gz"),
            timeline: root.join("timeline").join("covid-events.csv"),
            taxonomies,
            stats: Some(StatsSources {
                tweets: stats.join("tweets-daily.csv"),
                retweets: stats.join("tweets-retweeted-daily.csv"),
                users: stats.join("users-daily.csv"),
            }),
        }
    }

    /// Reads a JSON manifest. Relative paths are resolved against the
    /// manifest's directory.
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
        let mut sources: DataSources = serde_json::from_str(&raw)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        sources.rebase(base);
        Ok(sources)
    }

    fn rebase(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.unigrams.values_mut().for_each(fix);
        self.bigrams.values_mut().for_each(fix);
        self.taxonomies.values_mut().for_each(fix);
        fix(&mut self.timeline);
        if let Some(stats) = self.stats.as_mut() {
            fix(&mut stats.tweets);
            fix(&mut stats.retweets);
            fix(&mut stats.users);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn compare_selector_accepts_none_sentinel() {
        assert_eq!(parse_compare("none"), Ok(None));
        assert_eq!(parse_compare("None"), Ok(None));
        assert_eq!(parse_compare("cures"), Ok(Some(Subset::Cures)));
        assert!(parse_compare("politics").is_err());
    }

    #[test]
    fn date_range_validity_and_span() {
        let r = DateRange::new(d("2020-05-01"), d("2020-04-01"));
        assert!(!r.is_valid());

        let span = DateRange::spanning(vec![d("2020-05-01"), d("2020-04-13"), d("2021-01-10")])
            .unwrap();
        assert_eq!(span, DateRange::new(d("2020-04-13"), d("2021-01-10")));
        assert!(span.contains(d("2020-04-13")));
        assert!(!span.contains(d("2021-01-11")));
        assert!(DateRange::spanning(Vec::new()).is_none());
        assert_eq!(span.describe(), "13 April 2020 - 10 January 2021");
    }

    #[test]
    fn standard_layout_uses_upper_case_subset_dirs() {
        let s = DataSources::from_root("data");
        assert_eq!(
            s.bigrams[&Subset::Vaccines],
            PathBuf::from("data/VACCINES/bigrams.csv.gz")
        );
        assert!(!s.taxonomies.contains_key(&Subset::All));
        assert_eq!(s.taxonomies.len(), 4);
    }

    #[test]
    fn manifest_paths_are_relative_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("sources.json");
        fs::write(
            &manifest,
            r#"{
                "unigrams": {"all": "u.csv"},
                "bigrams": {"all": "/abs/b.csv"},
                "timeline": "t.csv"
            }"#,
        )
        .unwrap();
        let s = DataSources::from_manifest(&manifest).unwrap();
        assert_eq!(s.unigrams[&Subset::All], dir.path().join("u.csv"));
        assert_eq!(s.bigrams[&Subset::All], PathBuf::from("/abs/b.csv"));
        assert!(s.taxonomies.is_empty());
        assert!(s.stats.is_none());
    }

    #[test]
    fn metric_columns() {
        assert_eq!(Metric::Frequency.column(), "f_xy");
        assert_eq!(Metric::Pmi.column(), "pmi");
    }
}
