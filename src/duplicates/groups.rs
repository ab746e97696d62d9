//! Similarity graph and grouping of matched files.
//!
//! # Overview
//!
//! Every confirmed match adds an undirected edge between two files. Once all
//! files have been scanned, each connected component of the graph becomes one
//! group: files that are transitively similar end up together even if not
//! every pair was compared directly.
//!
//! # Example
//!
//! ```
//! use echodupe::cache::FileId;
//! use echodupe::duplicates::{components, SimilarityGraph};
//!
//! let id = |n| FileId::new(n).unwrap();
//! let mut graph = SimilarityGraph::new();
//! graph.add_edge(id(1), id(2));
//! graph.add_edge(id(2), id(3));
//! graph.add_edge(id(7), id(8));
//!
//! assert_eq!(
//!     components(&graph),
//!     vec![vec![id(1), id(2), id(3)], vec![id(7), id(8)]]
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::cache::{FileId, FileRecord};

/// Undirected graph of confirmed matches.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    adjacency: BTreeMap<FileId, BTreeSet<FileId>>,
}

impl SimilarityGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `a` and `b`. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, a: FileId, b: FileId) {
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Number of files with at least one edge.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let endpoints: usize = self
            .adjacency
            .iter()
            .map(|(id, peers)| peers.len() + usize::from(peers.contains(id)))
            .sum();
        endpoints / 2
    }

    /// Whether no edges have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Connected components of `graph`.
///
/// Uses an explicit stack, so arbitrarily long chains of matches can't
/// overflow the call stack. Members of each component are sorted by ID, and
/// components are ordered by their smallest ID.
#[must_use]
pub fn components(graph: &SimilarityGraph) -> Vec<Vec<FileId>> {
    let mut visited: HashSet<FileId> = HashSet::with_capacity(graph.adjacency.len());
    let mut result = Vec::new();

    for &start in graph.adjacency.keys() {
        if !visited.insert(start) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            component.push(node);
            for &peer in graph.adjacency.get(&node).into_iter().flatten() {
                if visited.insert(peer) {
                    stack.push(peer);
                }
            }
        }

        component.sort_unstable();
        result.push(component);
    }

    result
}

/// A group of recordings judged to be the same audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioGroup {
    /// Member files, sorted by path
    pub files: Vec<FileRecord>,
}

impl AudioGroup {
    /// Build a group, sorting members by path.
    #[must_use]
    pub fn new(mut files: Vec<FileRecord>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Relative paths of the member files.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    /// Path of the first member, used to order groups.
    #[must_use]
    pub fn first_path(&self) -> &str {
        self.files.first().map_or("", |f| f.path.as_str())
    }
}
