//! Topic taxonomies: nested categories with vocabulary lists, read from YAML,
//! normalized into single-word terms and turned into a directed graph for
//! "vocabulary under category X" queries.
//!
//! Every category and every vocabulary token gets a fresh [`Uuid`] per load.
//! The same spelling can be a category ("vaccines") and a term ("vaccines"),
//! or a term in several categories, and each occurrence must stay a distinct
//! graph node.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde_yaml::Value;
use uuid::Uuid;

use crate::config::Subset;
use crate::error::{ExplorerError, Result};

/// Tokens dropped from vocabulary phrases.
pub const VOCABULARY_STOPWORDS: [&str; 3] = ["and", "&", "or"];

/// A taxonomy entry as written in the YAML file. Absent keys are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCategory {
    pub category: Option<String>,
    pub vocabulary: Vec<String>,
    pub subcategories: Vec<RawCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub id: Uuid,
    pub children: Vec<TaxonomyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyTerm {
    pub name: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomyNode {
    Category(Category),
    Term(VocabularyTerm),
}

impl Category {
    pub fn subcategories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.children.iter().filter_map(|c| match c {
            TaxonomyNode::Category(cat) => Some(cat),
            TaxonomyNode::Term(_) => None,
        })
    }

    pub fn terms(&self) -> impl Iterator<Item = &VocabularyTerm> + '_ {
        self.children.iter().filter_map(|c| match c {
            TaxonomyNode::Term(term) => Some(term),
            TaxonomyNode::Category(_) => None,
        })
    }
}

// ---- YAML ----

/// Parses one taxonomy document.
pub fn parse_taxonomy(yaml: &str, origin: &Path) -> Result<Vec<RawCategory>> {
    let value: Value = serde_yaml::from_str(yaml).map_err(|e| ExplorerError::Yaml {
        path: origin.to_path_buf(),
        source: e,
    })?;
    Ok(raw_nodes(&value))
}

/// Reads and concatenates the taxonomy files in subset order.
pub fn load_taxonomies(paths: &BTreeMap<Subset, PathBuf>) -> Result<Vec<RawCategory>> {
    let mut out = Vec::new();
    for path in paths.values() {
        let yaml = fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
        out.extend(parse_taxonomy(&yaml, path)?);
    }
    Ok(out)
}

fn raw_nodes(value: &Value) -> Vec<RawCategory> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(raw_node).collect(),
        Value::Mapping(map) if is_entry(map) => raw_node(value).into_iter().collect(),
        Value::Mapping(map) => map.values().filter_map(raw_node).collect(),
        _ => Vec::new(),
    }
}

fn is_entry(map: &serde_yaml::Mapping) -> bool {
    ["category", "vocabulary", "subcategories"]
        .iter()
        .any(|k| map.contains_key(*k))
}

fn raw_node(value: &Value) -> Option<RawCategory> {
    let map = value.as_mapping()?;
    let category = map.get("category").and_then(scalar_string);
    let vocabulary = match map.get("vocabulary") {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(other) => scalar_string(other).into_iter().collect(),
        None => Vec::new(),
    };
    let subcategories = map
        .get("subcategories")
        .map(raw_nodes)
        .unwrap_or_default();
    Some(RawCategory {
        category,
        vocabulary,
        subcategories,
    })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---- Normalization ----

/// Splits a vocabulary phrase into lower-case single-word tokens, removing
/// `*` and the [`VOCABULARY_STOPWORDS`].
pub fn tokenize_vocabulary(phrase: &str) -> Vec<String> {
    phrase
        .split_whitespace()
        .map(|w| w.to_lowercase().replace('*', ""))
        .filter(|w| !w.is_empty() && !VOCABULARY_STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Normalizes raw entries into category trees with fresh identifiers.
///
/// An entry without a category name has nothing to hang its vocabulary on;
/// the vocabulary is dropped and its subcategories become roots.
pub fn normalize(raw: &[RawCategory]) -> Vec<Category> {
    raw.iter()
        .flat_map(|entry| match &entry.category {
            Some(name) => vec![normalize_category(name, entry)],
            None => normalize(&entry.subcategories),
        })
        .collect()
}

fn normalize_category(name: &str, entry: &RawCategory) -> Category {
    let terms = entry
        .vocabulary
        .iter()
        .flat_map(|phrase| tokenize_vocabulary(phrase))
        .map(|word| {
            TaxonomyNode::Term(VocabularyTerm {
                name: word,
                id: Uuid::new_v4(),
            })
        });
    let subcategories = normalize(&entry.subcategories)
        .into_iter()
        .map(TaxonomyNode::Category);
    Category {
        name: name.to_lowercase(),
        id: Uuid::new_v4(),
        children: terms.chain(subcategories).collect(),
    }
}

/// Breadcrumb label per category (`"Vaccines > Side effects"`), pre-order.
pub fn category_labels(roots: &[Category]) -> Vec<(Uuid, String)> {
    labels_under(roots, &[])
}

fn labels_under<'a>(
    categories: impl IntoIterator<Item = &'a Category>,
    path: &[String],
) -> Vec<(Uuid, String)> {
    let mut out = Vec::new();
    for category in categories {
        let mut here = path.to_vec();
        here.push(capitalize(&category.name));
        out.push((category.id, here.join(" > ")));
        out.extend(labels_under(category.subcategories(), &here));
    }
    out
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ---- Graph ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Category,
    Vocabulary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyVertex {
    pub id: Uuid,
    pub label: String,
    pub kind: NodeKind,
}

/// Category → subcategory and category → vocabulary edges.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyGraph {
    graph: DiGraph<TaxonomyVertex, ()>,
    index: HashMap<Uuid, NodeIndex>,
}

impl TaxonomyGraph {
    pub fn from_tree(roots: &[Category]) -> Self {
        let mut g = TaxonomyGraph::default();
        for root in roots {
            g.add_category(root, None);
        }
        debug!(
            "Taxonomy graph: {} nodes, {} edges",
            g.graph.node_count(),
            g.graph.edge_count()
        );
        g
    }

    fn add_category(&mut self, category: &Category, parent: Option<NodeIndex>) {
        let idx = self.add_vertex(category.id, &category.name, NodeKind::Category);
        if let Some(parent) = parent {
            self.graph.add_edge(parent, idx, ());
        }
        for child in &category.children {
            match child {
                TaxonomyNode::Term(term) => {
                    let t = self.add_vertex(term.id, &term.name, NodeKind::Vocabulary);
                    self.graph.add_edge(idx, t, ());
                }
                TaxonomyNode::Category(sub) => self.add_category(sub, Some(idx)),
            }
        }
    }

    fn add_vertex(&mut self, id: Uuid, label: &str, kind: NodeKind) -> NodeIndex {
        let idx = self.graph.add_node(TaxonomyVertex {
            id,
            label: label.to_string(),
            kind,
        });
        self.index.insert(id, idx);
        idx
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn vertex(&self, id: Uuid) -> Option<&TaxonomyVertex> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vocabulary labels, case-insensitively sorted: all of them for `None`,
    /// or those descending from the given category. Unknown ids yield an
    /// empty list.
    pub fn vocabulary_of(&self, category: Option<Uuid>) -> Vec<String> {
        let mut words: Vec<String> = match category {
            None => self
                .graph
                .node_weights()
                .filter(|v| v.kind == NodeKind::Vocabulary)
                .map(|v| v.label.clone())
                .collect(),
            Some(id) => match self.index.get(&id) {
                None => Vec::new(),
                Some(&start) => {
                    let mut out = Vec::new();
                    let mut dfs = Dfs::new(&self.graph, start);
                    while let Some(idx) = dfs.next(&self.graph) {
                        let v = &self.graph[idx];
                        if idx != start && v.kind == NodeKind::Vocabulary {
                            out.push(v.label.clone());
                        }
                    }
                    out
                }
            },
        };
        words.sort_by_cached_key(|w| w.to_lowercase());
        words
    }
}

/// Normalized taxonomies with their graph and category labels.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub roots: Vec<Category>,
    pub graph: TaxonomyGraph,
    pub categories: Vec<(Uuid, String)>,
}

impl Taxonomy {
    pub fn from_raw(raw: &[RawCategory]) -> Self {
        let roots = normalize(raw);
        let graph = TaxonomyGraph::from_tree(&roots);
        let categories = category_labels(&roots);
        Taxonomy {
            roots,
            graph,
            categories,
        }
    }

    pub fn load(paths: &BTreeMap<Subset, PathBuf>) -> Result<Self> {
        Ok(Taxonomy::from_raw(&load_taxonomies(paths)?))
    }

    pub fn label_of(&self, id: Uuid) -> Option<&str> {
        self.categories
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, label)| label.as_str())
    }

    /// Resolves a breadcrumb label (case-insensitive) to its category id.
    /// Identifiers are fresh per load, so this is how a selection survives a
    /// reload. Unknown labels log a warning and resolve to `None`.
    pub fn resolve_category(&self, label: &str) -> Option<Uuid> {
        let wanted = label.trim().to_lowercase();
        let found = self
            .categories
            .iter()
            .find(|(_, l)| l.to_lowercase() == wanted)
            .map(|(id, _)| *id);
        if found.is_none() {
            warn!("Unknown taxonomy category {label:?}; suggesting from all vocabulary");
        }
        found
    }
}
