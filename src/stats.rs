//! Daily corpus statistics behind the "about the data" report: tweets,
//! engagement on them, and new user accounts.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::DateRange;
use crate::frequency::{CHART_WIDTH, VEGA_LITE_SCHEMA};
use crate::error::{ExplorerError, Result};
use crate::table::csv_reader;

const TIMESTAMP_COLUMN: &str = "created_at";

/// Rows dated before the platform existed are collection noise.
pub fn earliest_valid_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2006, 3, 1).unwrap_or(NaiveDate::MIN)
}

/// Per-day sums of every numeric column of a statistics file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyStats {
    days: BTreeMap<NaiveDate, BTreeMap<String, u64>>,
}

/// Parses a timestamp, dropping any offset (`2020-04-13 10:22:01+00:00`,
/// RFC 3339, naive date-time, or plain date).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f.max(0.0).round() as u64))
}

impl DailyStats {
    /// Loads a statistics file, resampling to whole days.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv_reader(path)?;
        let headers = reader
            .headers()
            .map_err(|e| ExplorerError::csv(path, e))?
            .clone();
        let ts = headers
            .iter()
            .position(|h| h == TIMESTAMP_COLUMN)
            .ok_or_else(|| ExplorerError::MissingColumn {
                path: path.to_path_buf(),
                column: TIMESTAMP_COLUMN.to_string(),
            })?;

        let cutoff = earliest_valid_date();
        let mut stats = DailyStats::default();
        for record in reader.records() {
            let record = record.map_err(|e| ExplorerError::csv(path, e))?;
            let raw = record.get(ts).unwrap_or_default();
            let day = parse_day(raw).ok_or_else(|| ExplorerError::Timestamp {
                path: path.to_path_buf(),
                value: raw.to_string(),
            })?;
            if day < cutoff {
                continue;
            }
            let sums = stats.days.entry(day).or_default();
            for (i, (name, value)) in headers.iter().zip(record.iter()).enumerate() {
                if i == ts {
                    continue;
                }
                if let Some(n) = parse_count(value) {
                    *sums.entry(name.to_string()).or_insert(0) += n;
                }
            }
        }
        debug!("{}: {} days", path.display(), stats.days.len());
        Ok(stats)
    }

    pub fn total(&self, column: &str, range: &DateRange) -> u64 {
        self.days
            .iter()
            .filter(|(day, _)| range.contains(**day))
            .filter_map(|(_, sums)| sums.get(column))
            .sum()
    }

    pub fn series(&self, column: &str, range: &DateRange) -> Vec<(NaiveDate, u64)> {
        self.days
            .iter()
            .filter(|(day, _)| range.contains(**day))
            .map(|(day, sums)| (*day, sums.get(column).copied().unwrap_or(0)))
            .collect()
    }

    pub fn span(&self) -> Option<DateRange> {
        DateRange::spanning(self.days.keys().copied())
    }
}

/// Which statistics file a daily chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTable {
    Tweets,
    Retweets,
    Users,
}

/// One per-day bar chart of the "about" report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyChart {
    pub table: StatsTable,
    pub column: &'static str,
    pub heading: &'static str,
    pub note: Option<&'static str>,
    pub title: &'static str,
    pub axis: &'static str,
}

pub const DAILY_CHARTS: [DailyChart; 6] = [
    DailyChart {
        table: StatsTable::Tweets,
        column: "tweet_count",
        heading: "Tweets",
        note: None,
        title: "Tweets per day",
        axis: "Number of tweets",
    },
    DailyChart {
        table: StatsTable::Retweets,
        column: "retweet_count",
        heading: "Retweeted tweets",
        note: Some("The number of times the tweets have been retweeted."),
        title: "Retweeted tweets per day",
        axis: "Number of retweets",
    },
    DailyChart {
        table: StatsTable::Retweets,
        column: "favorite_count",
        heading: "Favourites",
        note: Some("The number of times the tweets have been favourited."),
        title: "Favourites per day",
        axis: "Number of favourites",
    },
    DailyChart {
        table: StatsTable::Retweets,
        column: "reply_count",
        heading: "Replies",
        note: Some("The number of times the tweets have been replied to."),
        title: "Replies per day",
        axis: "Number of replies",
    },
    DailyChart {
        table: StatsTable::Retweets,
        column: "quote_count",
        heading: "Quotes",
        note: Some("The number of times the tweets have been quoted."),
        title: "Quotes per day",
        axis: "Number of quotes",
    },
    DailyChart {
        table: StatsTable::Users,
        column: "user_count",
        heading: "Account creation",
        note: Some("The number of new user accounts created."),
        title: "Accounts created per day",
        axis: "Number of accounts",
    },
];

/// Per-day counts of one statistics column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub column: String,
    pub days: Vec<(NaiveDate, u64)>,
}

/// Headline numbers for a date range, plus the per-day series behind each
/// of them (in [`DAILY_CHARTS`] order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub tweets: u64,
    pub retweeted: u64,
    pub favourited: u64,
    pub replied: u64,
    pub quoted: u64,
    pub new_users: u64,
    pub daily: Vec<DailySeries>,
}

impl CorpusSummary {
    pub fn compute(
        tweets: &DailyStats,
        retweets: &DailyStats,
        users: &DailyStats,
        range: &DateRange,
    ) -> Self {
        let table = |t: StatsTable| match t {
            StatsTable::Tweets => tweets,
            StatsTable::Retweets => retweets,
            StatsTable::Users => users,
        };
        CorpusSummary {
            tweets: tweets.total("tweet_count", range),
            retweeted: retweets.total("retweet_count", range),
            favourited: retweets.total("favorite_count", range),
            replied: retweets.total("reply_count", range),
            quoted: retweets.total("quote_count", range),
            new_users: users.total("user_count", range),
            daily: DAILY_CHARTS
                .iter()
                .map(|chart| DailySeries {
                    column: chart.column.to_string(),
                    days: table(chart.table).series(chart.column, range),
                })
                .collect(),
        }
    }

    pub fn daily_of(&self, column: &str) -> Option<&DailySeries> {
        self.daily.iter().find(|s| s.column == column)
    }

    fn headline(&self) -> [(&'static str, u64); 6] {
        [
            ("Tweets", self.tweets),
            ("Retweeted", self.retweeted),
            ("Favourited", self.favourited),
            ("Replied", self.replied),
            ("Quoted", self.quoted),
            ("New user accounts created", self.new_users),
        ]
    }

    /// Plain-text table of the headline numbers.
    pub fn to_text(&self, range: &DateRange) -> String {
        let mut out = format!("Selected date range: {}\n", range.describe());
        for (label, n) in self.headline() {
            out.push_str(&format!("{label:<28}{:>14}\n", thousands(n)));
        }
        out
    }

    /// Headline numbers as `(label, formatted count)` rows.
    pub fn headline_rows(&self) -> Vec<(String, String)> {
        self.headline()
            .into_iter()
            .map(|(label, n)| (label.to_string(), thousands(n)))
            .collect()
    }
}

/// Vega-Lite bar chart of one daily series over the full date range.
pub fn daily_chart_spec(chart: &DailyChart, days: &[(NaiveDate, u64)], range: &DateRange) -> Value {
    let values: Vec<Value> = days
        .iter()
        .map(|(day, count)| json!({ "created_at": day.to_string(), "count": count }))
        .collect();
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": chart.title,
        "width": CHART_WIDTH,
        "data": { "values": values },
        "params": [{ "name": "zoom", "select": "interval", "bind": "scales" }],
        "mark": { "type": "bar" },
        "encoding": {
            "x": {
                "field": "created_at",
                "type": "temporal",
                "title": "Date",
                "scale": { "domain": [range.start.to_string(), range.end.to_string()] },
                "axis": { "format": "%Y-%m-%d" }
            },
            "y": { "field": "count", "type": "quantitative", "title": chart.axis },
            "tooltip": [
                { "field": "created_at", "type": "temporal", "title": "Date" },
                { "field": "count", "type": "quantitative", "title": chart.axis, "format": ",.0f" }
            ]
        }
    })
}

/// `1234567` → `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
