//! Integration tests for `corpus_explorer`.
//
// This suite verifies:
// - Loading a data root (gzipped CSV tables, YAML taxonomies, timeline, stats)
// - Dashboard rendering from loaded data (library level)
// - CLI behaviour of `explore` and `about`, including session directories,
//   renderers, comparison mode and argument validation
//
// Notes:
// - CLI tests run the binary with a per-process working directory.
// - Tests that change the global CWD are marked #[serial].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use regex::Regex;
use serde_json::Value as Json;
use serial_test::serial;
use tempfile::tempdir;

use corpus_explorer::dashboard::{DATE_RANGE_ERROR, NO_WORDS_SELECTED};
use corpus_explorer::render::{ArtifactStore, NetworkStyle};
use corpus_explorer::{
    DashboardState, DataSources, DataStore, DateRange, Metric, RenderPipeline, Subset, publish,
    render_dashboard,
};

// --------------------- helpers ---------------------

const SUBSET_DIRS: [&str; 5] = ["ALL", "CONSPIRACY", "CURES", "ORIGINS", "VACCINES"];

fn write_gz(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut enc = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    enc.write_all(content.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn write_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let f = dir.child(name);
    f.write_str(content).unwrap();
    f.path().to_path_buf()
}

fn unigrams_for(subset: &str) -> &'static str {
    match subset {
        "ALL" => {
            "date,word,frequency\n\
             2020-04-13,truth,3\n\
             2020-04-14,hoax,2\n\
             2020-04-15,lies,4\n\
             2020-04-15,vaccine,1\n"
        }
        "CURES" => "date,word,frequency\n2020-04-14,bleach,6\n",
        _ => "date,word,frequency\n",
    }
}

fn bigrams_for(subset: &str) -> &'static str {
    match subset {
        "ALL" => {
            "date,x,y,f_xy,pmi\n\
             2020-04-13,truth,hoax,5,1.2\n\
             2020-04-14,hoax,lies,9,0.4\n\
             2020-04-15,vaccine,chip,3,2.5\n"
        }
        "CURES" => "date,x,y,f_xy,pmi\n2020-04-14,bleach,truth,2,3.0\n",
        _ => "date,x,y,f_xy,pmi\n",
    }
}

/// Populate a data root with the standard layout.
fn data_root(dir: &assert_fs::TempDir) -> PathBuf {
    let root = dir.path().join("data");
    for subset in SUBSET_DIRS {
        write_gz(&root.join(subset).join("unigrams.csv.gz"), unigrams_for(subset));
        write_gz(&root.join(subset).join("bigrams.csv.gz"), bigrams_for(subset));
    }
    write_file(
        dir,
        "data/timeline/covid-events.csv",
        "date,description,summary\n2020-04-14,Lockdown extended by three weeks,Lockdown\n",
    );
    for key in ["conspiracy", "origins", "vaccines"] {
        write_file(
            dir,
            &format!("data/taxonomies/{key}.yaml"),
            &format!("category: {key}\nvocabulary: [placeholder]\n"),
        );
    }
    write_file(
        dir,
        "data/taxonomies/cures.yaml",
        "category: Cures\n\
         vocabulary: [Bleach, \"Vitamin C and zinc\"]\n\
         subcategories:\n  \
           - category: Drugs\n    \
             vocabulary: [Ivermectin*]\n",
    );
    write_file(
        dir,
        "data/stats/tweets-daily.csv",
        "created_at,tweet_count\n\
         2005-01-01 00:00:00+00:00,99999\n\
         2020-04-13 08:00:00+00:00,1000\n\
         2020-04-13 20:00:00+00:00,200\n\
         2020-04-14 09:00:00+00:00,300\n",
    );
    write_file(
        dir,
        "data/stats/tweets-retweeted-daily.csv",
        "created_at,retweet_count,favorite_count,reply_count,quote_count\n\
         2020-04-13 08:00:00+00:00,10,20,30,40\n",
    );
    write_file(
        dir,
        "data/stats/users-daily.csv",
        "created_at,user_count\n2020-04-14 09:00:00+00:00,7\n",
    );
    root
}

fn explorer() -> std::process::Command {
    std::process::Command::cargo_bin("corpus-explorer").unwrap()
}

/// Run `explore` successfully in `dir` and return stdout.
fn run_explore_ok(dir: &Path, args: &[&str]) -> String {
    let output = explorer()
        .current_dir(dir)
        .arg("explore")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).unwrap()
}

/// The single session directory under `output`.
fn session_dir(output: &Path) -> PathBuf {
    let re = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap();
    let dirs: Vec<PathBuf> = fs::read_dir(output)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| re.is_match(e.file_name().to_string_lossy().as_ref()))
        .map(|e| e.path())
        .collect();
    assert_eq!(dirs.len(), 1, "expected exactly one session directory");
    dirs[0].clone()
}

fn d(day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2020, 4, day).unwrap()
}

// --------------------- library tests ---------------------

#[test]
fn lib_loads_data_root_and_caches_snapshot() {
    let td = assert_fs::TempDir::new().unwrap();
    let root = data_root(&td);
    let mut store = DataStore::new(DataSources::from_root(&root));

    let data = store.snapshot().unwrap();
    assert_eq!(data.unigrams.select(Subset::All).len(), 4);
    assert_eq!(data.bigrams.select(Subset::Cures).len(), 1);
    assert!(data.bigrams.select(Subset::Origins).is_empty());
    assert_eq!(data.unigrams.date_span(), Some(DateRange::new(d(13), d(15))));
    assert_eq!(data.timeline.len(), 1);

    // "Vitamin C and zinc" drops the stopword, "Ivermectin*" loses the star.
    let cures = data.taxonomy.resolve_category("cures").unwrap();
    assert_eq!(
        data.taxonomy.graph.vocabulary_of(Some(cures)),
        vec!["bleach", "c", "ivermectin", "vitamin", "zinc"]
    );
    assert!(data.taxonomy.resolve_category("Cures > Drugs").is_some());

    let again = store.snapshot().unwrap();
    assert!(Arc::ptr_eq(&data.unigrams, &again.unigrams));
    assert!(Arc::ptr_eq(&data.taxonomy, &again.taxonomy));
}

#[test]
fn lib_dashboard_from_loaded_data() {
    let td = assert_fs::TempDir::new().unwrap();
    let root = data_root(&td);
    let data = DataStore::new(DataSources::from_root(&root)).snapshot().unwrap();

    let mut state = DashboardState::new(DateRange::new(d(13), d(15)));
    state.words = vec!["truth".into()];
    state.collocation.show_chart = true;
    state.collocation.metric = Metric::Frequency;
    state.collocation.top_k = 1;
    let page = render_dashboard(&state, &data, RenderPipeline::Interactive, &NetworkStyle::default())
        .unwrap();

    let nets = page.networks();
    assert_eq!(nets.len(), 1);
    let doc = nets[0].rendered.contents();
    assert!(doc.contains(r#""from":"truth""#));
    assert!(doc.contains(r#""to":"hoax""#));
    assert!(doc.contains(r#""value":5.0"#));
    assert!(!doc.contains("lies"));

    let out = tempdir().unwrap();
    let store = ArtifactStore::create(out.path()).unwrap();
    let html = publish(&page, &store).unwrap();
    assert!(fs::read_to_string(html).unwrap().contains("Dashboard: Tweets Explorer"));
    assert!(store.path("collocations.html").exists());
}

#[test]
fn lib_manifest_paths_are_relative_to_manifest() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let manifest = write_file(
        &td,
        "manifest.json",
        r#"{
  "unigrams": { "all": "data/ALL/unigrams.csv.gz" },
  "bigrams": { "all": "data/ALL/bigrams.csv.gz" },
  "timeline": "data/timeline/covid-events.csv"
}"#,
    );
    let sources = DataSources::from_manifest(&manifest).unwrap();
    assert_eq!(sources.timeline, td.path().join("data/timeline/covid-events.csv"));
    assert!(sources.taxonomies.is_empty());

    let data = DataStore::new(sources).snapshot().unwrap();
    assert_eq!(data.unigrams.select(Subset::All).len(), 4);
    assert!(data.unigrams.select(Subset::Cures).is_empty());
    assert!(data.taxonomy.categories.is_empty());
}

#[test]
#[serial]
fn lib_default_data_root_is_relative_to_cwd() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    std::env::set_current_dir(td.path()).unwrap();
    let data = DataStore::new(DataSources::from_root("data")).snapshot().unwrap();
    assert_eq!(data.bigrams.select(Subset::All).len(), 3);
}

// --------------------- CLI tests (explore) ---------------------

#[test]
fn cli_explore_writes_session_dashboard() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let stdout = run_explore_ok(td.path(), &["--timeline", "--frequency-data"]);

    let session = session_dir(&td.path().join("output"));
    let page = session.join("dashboard.html");
    assert!(stdout.contains("dashboard.html"));
    let html = fs::read_to_string(page).unwrap();
    assert!(html.contains("Selected date range: 13 April 2020 - 15 April 2020"));
    assert!(html.contains("vegaEmbed('#word-frequencies'"));
    assert!(html.contains("Lockdown extended by three weeks"));
    // Collocations are off by default.
    assert!(!session.join("collocations.html").exists());
}

#[test]
fn cli_explore_inverted_range_reports_error() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let stdout = run_explore_ok(
        td.path(),
        &["--from", "2020-04-15", "--to", "2020-04-13", "--collocations"],
    );
    assert!(stdout.contains(DATE_RANGE_ERROR));

    let session = session_dir(&td.path().join("output"));
    let html = fs::read_to_string(session.join("dashboard.html")).unwrap();
    assert!(html.contains("The end date must be later than the start date."));
    assert!(!html.contains("vegaEmbed("));
    assert!(!session.join("collocations.html").exists());
}

#[test]
fn cli_explore_absent_word_is_isolated_node() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    run_explore_ok(
        td.path(),
        &["--words", "zzz_not_present", "--collocations", "--metric", "frequency"],
    );
    let session = session_dir(&td.path().join("output"));
    let doc = fs::read_to_string(session.join("collocations.html")).unwrap();
    assert!(doc.contains(r#""id":"zzz_not_present""#));
    assert!(doc.contains("var edges = new vis.DataSet([]);"));
}

#[test]
fn cli_explore_compare_static_figures() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    run_explore_ok(
        td.path(),
        &[
            "--words",
            "truth",
            "--collocations",
            "--compare",
            "cures",
            "--renderer",
            "static",
            "--collocation-data",
        ],
    );
    let session = session_dir(&td.path().join("output"));
    let main = fs::read_to_string(session.join("collocations.svg")).unwrap();
    let cf = fs::read_to_string(session.join("collocations_cf.svg")).unwrap();
    assert!(main.starts_with("<svg") || main.starts_with("<?xml"));
    assert!(cf.contains("bleach"));

    let html = fs::read_to_string(session.join("dashboard.html")).unwrap();
    assert!(html.contains("Collocations in All"));
    assert!(html.contains("Collocations in Cures"));
    assert!(html.contains("Word collocations source data: Cures"));
}

#[test]
fn cli_explore_no_words_shows_info() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let stdout = run_explore_ok(td.path(), &["--words", ""]);
    assert!(stdout.contains(NO_WORDS_SELECTED));
}

#[test]
fn cli_explore_sessions_do_not_collide() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    run_explore_ok(td.path(), &["--collocations"]);
    run_explore_ok(td.path(), &["--collocations"]);
    let sessions = fs::read_dir(td.path().join("output")).unwrap().count();
    assert_eq!(sessions, 2);
}

#[test]
fn cli_explore_custom_output_and_category() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let out = td.path().join("artifacts");
    run_explore_ok(
        td.path(),
        &["--output", out.to_str().unwrap(), "--category", "Cures > Drugs"],
    );
    assert!(session_dir(&out).join("dashboard.html").exists());

    // An unknown category falls back to suggesting every word.
    run_explore_ok(td.path(), &["--category", "Nope"]);
}

#[test]
fn cli_explore_collocates_out_of_range_fails() {
    let td = tempdir().unwrap();
    for bad in ["0", "11"] {
        explorer()
            .current_dir(td.path())
            .args(["explore", "--collocates", bad])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--collocates"));
    }
}

#[test]
fn cli_explore_unknown_compare_subset_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    explorer()
        .current_dir(td.path())
        .args(["explore", "--compare", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown subset"));
}

#[test]
fn cli_explore_missing_data_fails() {
    let td = tempdir().unwrap();
    explorer()
        .current_dir(td.path())
        .args(["explore", "--data", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

// --------------------- CLI tests (about) ---------------------

#[test]
fn cli_about_prints_totals() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    explorer()
        .current_dir(td.path())
        .arg("about")
        .assert()
        .success()
        .stdout(predicate::str::contains("13 April 2020 - 14 April 2020"))
        .stdout(predicate::str::is_match(r"Tweets\s+1,500").unwrap())
        .stdout(predicate::str::is_match(r"New user accounts created\s+7").unwrap());
}

#[test]
fn cli_about_json_respects_range() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let output = explorer()
        .current_dir(td.path())
        .args(["about", "--json", "--from", "2020-04-14"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: Json = serde_json::from_slice(&output).unwrap();
    assert_eq!(v["tweets"], 300);
    assert_eq!(v["retweeted"], 0);
    assert_eq!(v["new_users"], 7);
    let daily = v["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 6);
    assert_eq!(daily[0]["column"], "tweet_count");
    assert_eq!(daily[0]["days"].as_array().unwrap().len(), 1);
    assert_eq!(daily[0]["days"][0][0], "2020-04-14");
}

#[test]
fn cli_about_writes_daily_charts() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    let stdout = explorer()
        .current_dir(td.path())
        .args(["about", "--output", "out"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(stdout).unwrap();
    let session = session_dir(&td.path().join("out"));
    let report = session.join("about.html");
    assert!(stdout.trim_end().ends_with("about.html"));

    let html = fs::read_to_string(report).unwrap();
    assert_eq!(html.matches("vegaEmbed(").count(), 6);
    assert!(html.contains("Tweets per day"));
    assert!(html.contains("Accounts created per day"));
    assert!(html.contains("1,500"));
}

#[test]
fn cli_about_inverted_range_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    data_root(&td);
    explorer()
        .current_dir(td.path())
        .args(["about", "--from", "2020-04-14", "--to", "2020-04-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end date must be later"));
}
