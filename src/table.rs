//! Delimited table loading: plain or gzip-compressed CSV/TSV files, read
//! into typed rows, optionally tagged with the subset they belong to.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use log::{debug, info};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{DateRange, Subset};
use crate::error::{ExplorerError, Result};

/// Daily frequency of a single word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unigram {
    pub date: NaiveDate,
    pub word: String,
    pub frequency: f64,
}

/// Daily co-occurrence statistics of a word pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bigram {
    pub date: NaiveDate,
    #[serde(alias = "x")]
    pub word_x: String,
    #[serde(alias = "y")]
    pub word_y: String,
    #[serde(alias = "f_xy")]
    pub frequency: f64,
    pub pmi: f64,
}

/// An event on the corpus timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub summary: String,
    /// Vertical placement hint for the timeline chart.
    #[serde(default)]
    pub position: Option<f64>,
}

/// Rows that carry a date, so they can be cut to a [`DateRange`].
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for Unigram {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Bigram {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for TimelineEvent {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Rows of the given slice that fall inside `range` (bounds inclusive).
pub fn filter_dates<T: Dated + Clone>(rows: &[T], range: &DateRange) -> Vec<T> {
    rows.iter()
        .filter(|r| range.contains(r.date()))
        .cloned()
        .collect()
}

/// Opens a file for reading, transparently decompressing `.gz`.
pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| ExplorerError::io(path, e))?;
    if is_gzip(path) {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|e| e == "gz").unwrap_or(false)
}

/// Tab for `.tsv` / `.tsv.gz`, comma otherwise.
fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tsv") { b'\t' } else { b',' }
}

/// Builds a CSV reader over a (possibly compressed) delimited file.
pub fn csv_reader(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    let input = open_maybe_gz(path)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .trim(csv::Trim::All)
        .from_reader(input))
}

/// Reads every row of a delimited file into `T`.
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let start = Instant::now();
    let mut reader = csv_reader(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| ExplorerError::csv(path, e))?;
    debug!(
        "Loaded {} rows from {} in {:?}",
        rows.len(),
        path.display(),
        start.elapsed()
    );
    Ok(rows)
}

/// Rows loaded from one file per subset, kept apart by subset key.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetTable<T> {
    rows: BTreeMap<Subset, Vec<T>>,
}

impl<T> SubsetTable<T> {
    pub fn from_rows(rows: BTreeMap<Subset, Vec<T>>) -> Self {
        SubsetTable { rows }
    }

    /// Rows of one subset; empty when the subset was not loaded.
    pub fn select(&self, subset: Subset) -> &[T] {
        self.rows.get(&subset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subsets(&self) -> impl Iterator<Item = Subset> + '_ {
        self.rows.keys().copied()
    }

    /// Every row of every subset, in subset order.
    pub fn iter(&self) -> impl Iterator<Item = (Subset, &T)> + '_ {
        self.rows
            .iter()
            .flat_map(|(s, rows)| rows.iter().map(move |r| (*s, r)))
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: DeserializeOwned + Send> SubsetTable<T> {
    /// Loads all subset files in parallel.
    pub fn load(paths: &BTreeMap<Subset, PathBuf>) -> Result<Self> {
        let start = Instant::now();
        let loaded = paths
            .par_iter()
            .map(|(subset, path)| load_table::<T>(path).map(|rows| (*subset, rows)))
            .collect::<Result<Vec<_>>>()?;
        let table = SubsetTable::from_rows(loaded.into_iter().collect());
        info!(
            "Loaded {} rows across {} subsets in {:?}",
            table.len(),
            paths.len(),
            start.elapsed()
        );
        Ok(table)
    }
}

impl SubsetTable<Unigram> {
    /// Distinct words across every subset, in first-seen order.
    pub fn distinct_words(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (_, row) in self.iter() {
            if seen.insert(row.word.as_str()) {
                out.push(row.word.clone());
            }
        }
        out
    }

    /// Date span of every loaded unigram row.
    pub fn date_span(&self) -> Option<DateRange> {
        DateRange::spanning(self.iter().map(|(_, r)| r.date))
    }
}

/// Gives each event a vertical position, keeping explicit ones and
/// staggering the rest over four lanes so neighbouring labels do not overlap.
pub fn assign_positions(events: &mut [TimelineEvent]) {
    for (i, event) in events.iter_mut().enumerate() {
        if event.position.is_none() {
            event.position = Some((i % 4) as f64 + 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn write_gz(path: &Path, content: &str) {
        let f = File::create(path).unwrap();
        let mut enc = GzEncoder::new(f, Compression::default());
        enc.write_all(content.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn reads_gzip_bigrams_with_short_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bigrams.csv.gz");
        write_gz(
            &path,
            "date,x,y,f_xy,pmi\n2020-04-13,truth,hoax,5,1.2\n2020-04-14,hoax,lies,9,0.4\n",
        );
        let rows: Vec<Bigram> = load_table(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].word_x, "truth");
        assert_eq!(rows[1].frequency, 9.0);
        assert!((rows[0].pmi - 1.2).abs() < 1e-12);
    }

    #[test]
    fn reads_tsv_and_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unigrams.tsv");
        std::fs::write(
            &path,
            "date\tword\tfrequency\textra\n2020-04-13\tvaccine\t3\tx\n",
        )
        .unwrap();
        let rows: Vec<Unigram> = load_table(&path).unwrap();
        assert_eq!(
            rows,
            vec![Unigram {
                date: NaiveDate::from_ymd_opt(2020, 4, 13).unwrap(),
                word: "vaccine".into(),
                frequency: 3.0
            }]
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_table::<Unigram>(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ExplorerError::Io { .. }));
    }

    #[test]
    fn subset_table_selects_and_spans() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "date,word,frequency\n2020-04-13,truth,1\n2020-05-01,lies,2\n").unwrap();
        std::fs::write(&b, "date,word,frequency\n2021-01-10,truth,4\n").unwrap();
        let mut paths = BTreeMap::new();
        paths.insert(Subset::All, a);
        paths.insert(Subset::Cures, b);

        let table = SubsetTable::<Unigram>::load(&paths).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.select(Subset::Cures).len(), 1);
        assert!(table.select(Subset::Origins).is_empty());
        assert_eq!(table.distinct_words(), vec!["truth", "lies"]);
        let span = table.date_span().unwrap();
        assert_eq!(span.start, NaiveDate::from_ymd_opt(2020, 4, 13).unwrap());
        assert_eq!(span.end, NaiveDate::from_ymd_opt(2021, 1, 10).unwrap());
    }

    #[test]
    fn timeline_positions_fill_gaps_only() {
        let date = NaiveDate::from_ymd_opt(2020, 4, 13).unwrap();
        let mut events: Vec<TimelineEvent> = (0..3)
            .map(|i| TimelineEvent {
                date,
                description: format!("event {i}"),
                summary: String::new(),
                position: if i == 1 { Some(9.0) } else { None },
            })
            .collect();
        assign_positions(&mut events);
        let positions: Vec<f64> = events.iter().map(|e| e.position.unwrap()).collect();
        assert_eq!(positions, vec![1.0, 9.0, 3.0]);
    }
}
