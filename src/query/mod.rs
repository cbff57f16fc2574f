//! Read-only projections over a graph store.
//!
//! Ranked lists are ordered by descending weight; equal weights keep the
//! store's insertion order (the sort is stable over insertion-ordered rows).

use std::cmp::Ordering;

use hashbrown::HashSet;

use crate::model::{FileNode, NodePath};
use crate::storage::GraphStore;

pub fn weight<S: GraphStore + ?Sized>(store: &S, path: &NodePath) -> f64 {
    store.weight(path)
}

pub fn neighbors<S: GraphStore + ?Sized>(store: &S, path: &NodePath) -> HashSet<NodePath> {
    store.neighbors(path)
}

/// Every node, heaviest first.
pub fn sorted_by_weight<S: GraphStore + ?Sized>(store: &S) -> Vec<FileNode> {
    let mut rows = store.nodes();
    rows.sort_by(by_weight_desc);
    rows
}

/// Neighbors of `path`, heaviest first. Empty for unknown paths.
pub fn sorted_neighbors<S: GraphStore + ?Sized>(store: &S, path: &NodePath) -> Vec<FileNode> {
    let neighbors = store.neighbors(path);
    if neighbors.is_empty() {
        return Vec::new();
    }
    let mut rows: Vec<FileNode> = store
        .nodes()
        .into_iter()
        .filter(|n| neighbors.contains(&n.path))
        .collect();
    rows.sort_by(by_weight_desc);
    rows
}

/// The `n` heaviest nodes.
pub fn top<S: GraphStore + ?Sized>(store: &S, n: usize) -> Vec<FileNode> {
    let mut rows = sorted_by_weight(store);
    rows.truncate(n);
    rows
}

fn by_weight_desc(a: &FileNode, b: &FileNode) -> Ordering {
    b.weight.total_cmp(&a.weight)
}
