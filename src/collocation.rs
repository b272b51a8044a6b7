//! Collocation networks: the strongest co-occurring neighbours of a set of
//! focus words, ranked by bigram frequency or PMI.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::config::Metric;
use crate::table::Bigram;

/// One ranked pairing, with the focus word in `source`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collocate {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Ranks the neighbours of every focus word and keeps the top `top_k` each.
///
/// Rows are deduplicated ignoring their date. A row matches when either word
/// is a focus word; rows matching on `word_y` are swapped so the focus word
/// is always the source. The relation stays symmetric, the swap only fixes
/// which column is grouped on. Matches are ordered by source, then by metric
/// descending; equal metric values keep table order (x-matches before
/// swapped y-matches).
pub fn select_collocates(
    bigrams: &[Bigram],
    focus: &BTreeSet<String>,
    metric: Metric,
    top_k: usize,
) -> Vec<Collocate> {
    let mut seen = HashSet::new();
    let unique: Vec<&Bigram> = bigrams
        .iter()
        .filter(|b| {
            seen.insert((
                b.word_x.as_str(),
                b.word_y.as_str(),
                b.frequency.to_bits(),
                b.pmi.to_bits(),
            ))
        })
        .collect();

    let forward = unique
        .iter()
        .filter(|b| focus.contains(&b.word_x))
        .map(|b| Collocate {
            source: b.word_x.clone(),
            target: b.word_y.clone(),
            weight: metric.value_of(b),
        });
    let swapped = unique
        .iter()
        .filter(|b| focus.contains(&b.word_y))
        .map(|b| Collocate {
            source: b.word_y.clone(),
            target: b.word_x.clone(),
            weight: metric.value_of(b),
        });
    let mut ranked: Vec<Collocate> = forward.chain(swapped).collect();
    ranked.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then_with(|| b.weight.total_cmp(&a.weight))
    });

    let mut taken: HashMap<String, usize> = HashMap::new();
    ranked.retain(|c| {
        let n = taken.entry(c.source.clone()).or_insert(0);
        *n += 1;
        *n <= top_k
    });
    ranked
}

/// Undirected weighted word graph. Built once, never edited afterwards.
#[derive(Debug, Clone)]
pub struct CollocationGraph {
    graph: UnGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
    metric: Metric,
}

impl CollocationGraph {
    fn empty(metric: Metric) -> Self {
        CollocationGraph {
            graph: UnGraph::default(),
            index: HashMap::new(),
            metric,
        }
    }

    fn node(&mut self, word: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(word) {
            return *idx;
        }
        let idx = self.graph.add_node(word.to_string());
        self.index.insert(word.to_string(), idx);
        idx
    }

    /// Graph of the given pairings; a pair listed from both ends becomes a
    /// single edge holding the weight seen last.
    pub fn from_collocates(collocates: &[Collocate], metric: Metric) -> Self {
        let mut g = CollocationGraph::empty(metric);
        for c in collocates {
            let a = g.node(&c.source);
            let b = g.node(&c.target);
            g.graph.update_edge(a, b, c.weight);
        }
        g
    }

    /// Isolated nodes, no edges.
    pub fn isolated<'a>(words: impl IntoIterator<Item = &'a String>, metric: Metric) -> Self {
        let mut g = CollocationGraph::empty(metric);
        for w in words {
            g.node(w);
        }
        g
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Words in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edge list as `(source, target, weight)` in insertion order.
    pub fn edges(&self) -> Vec<Collocate> {
        self.graph
            .edge_references()
            .map(|e| Collocate {
                source: self.graph[e.source()].clone(),
                target: self.graph[e.target()].clone(),
                weight: *e.weight(),
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn neighbors(&self, word: &str) -> Vec<&str> {
        match self.index.get(word) {
            Some(idx) => self
                .graph
                .neighbors(*idx)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn degree(&self, word: &str) -> usize {
        self.index
            .get(word)
            .map(|idx| self.graph.edges(*idx).count())
            .unwrap_or(0)
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        let (a, b) = (self.index.get(a)?, self.index.get(b)?);
        self.graph.find_edge(*a, *b).map(|e| self.graph[e])
    }

    pub(crate) fn inner(&self) -> &UnGraph<String, f64> {
        &self.graph
    }
}

/// Collocation network of `focus` words over a bigram table.
///
/// When no row survives, the result holds every focus word as an isolated
/// node so there is always something to draw. `top_k` is not validated here;
/// zero yields the isolated-node graph.
pub fn build_collocation_graph(
    bigrams: &[Bigram],
    focus: &BTreeSet<String>,
    metric: Metric,
    top_k: usize,
) -> CollocationGraph {
    let collocates = select_collocates(bigrams, focus, metric, top_k);
    let graph = if collocates.is_empty() {
        CollocationGraph::isolated(focus, metric)
    } else {
        CollocationGraph::from_collocates(&collocates, metric)
    };
    debug!(
        "Collocation graph ({}): {} focus words, {} nodes, {} edges",
        metric.column(),
        focus.len(),
        graph.node_count(),
        graph.edge_count()
    );
    graph
}
