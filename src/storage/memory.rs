//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses two plain hash tables with no internal locking.
//!
//! ## Limitations
//!
//! - **No reverse index**: `remove_node()` and `rename_node()` sweep every
//!   adjacency set, O(total edges) per call. Fine for a project tree.
//! - **No persistence**: the store lives for one session and is rebuilt from
//!   source on the next one.
//! - **Single owner**: mutation takes `&mut self`. Share it across threads
//!   through `SharedDoiGraph`, which serializes writers with a lock.

use hashbrown::{HashMap, HashSet};
use tracing::trace;

use crate::model::{FileNode, NodePath};
use super::GraphStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// Session-lifetime node and adjacency tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<NodePath, NodeEntry>,
    /// path → set of adjacent paths (symmetric)
    adjacency: HashMap<NodePath, HashSet<NodePath>>,
    next_seq: u64,
}

#[derive(Debug, Clone, Copy)]
struct NodeEntry {
    weight: f64,
    /// Insertion rank, the tie-breaker for ranked queries.
    seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_entry(&mut self, path: &NodePath, weight: f64) -> bool {
        if self.nodes.contains_key(path) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.nodes.insert(path.clone(), NodeEntry { weight: weight.max(0.0), seq });
        self.adjacency.entry(path.clone()).or_default();
        true
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    // ========================================================================
    // Node table
    // ========================================================================

    fn add_node(&mut self, path: &NodePath, initial_weight: f64) -> bool {
        self.insert_entry(path, initial_weight)
    }

    fn remove_node(&mut self, path: &NodePath) -> bool {
        let existed = self.nodes.remove(path).is_some();
        self.adjacency.remove(path);

        // Fan-out sweep: purge every reference to the removed path
        for set in self.adjacency.values_mut() {
            set.remove(path);
        }

        if existed {
            trace!(path = %path, "node removed");
        }
        existed
    }

    fn rename_node(&mut self, old: &NodePath, new: &NodePath) -> bool {
        if !self.nodes.contains_key(old) {
            return false;
        }
        if old == new {
            return true;
        }

        // The target identity is replaced, not merged
        if self.nodes.contains_key(new) {
            self.remove_node(new);
        }

        if let Some(entry) = self.nodes.remove(old) {
            self.nodes.insert(new.clone(), entry);
        }
        let moved = self.adjacency.remove(old).unwrap_or_default();
        self.adjacency.insert(new.clone(), moved);

        // Rewrite references, including a self-reference in the moved set
        for set in self.adjacency.values_mut() {
            if set.remove(old) {
                set.insert(new.clone());
            }
        }

        trace!(from = %old, to = %new, "node renamed");
        true
    }

    fn contains(&self, path: &NodePath) -> bool {
        self.nodes.contains_key(path)
    }

    fn weight(&self, path: &NodePath) -> f64 {
        self.nodes.get(path).map_or(0.0, |e| e.weight)
    }

    fn add_weight(&mut self, path: &NodePath, delta: f64) -> bool {
        match self.nodes.get_mut(path) {
            Some(entry) => {
                entry.weight = (entry.weight + delta).max(0.0);
                true
            }
            None => false,
        }
    }

    fn decay_all(&mut self, amount: f64) {
        for entry in self.nodes.values_mut() {
            entry.weight = (entry.weight - amount).max(0.0);
        }
    }

    fn nodes(&self) -> Vec<FileNode> {
        let mut entries: Vec<(&NodePath, &NodeEntry)> = self.nodes.iter().collect();
        entries.sort_by_key(|(_, e)| e.seq);
        entries
            .into_iter()
            .map(|(path, e)| FileNode::new(path.clone(), e.weight))
            .collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Adjacency table
    // ========================================================================

    fn add_edge(&mut self, a: &NodePath, b: &NodePath) {
        self.insert_entry(a, 0.0);
        self.insert_entry(b, 0.0);

        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b.clone()).or_default().insert(a.clone());
    }

    fn neighbors(&self, path: &NodePath) -> HashSet<NodePath> {
        self.adjacency.get(path).cloned().unwrap_or_default()
    }

    fn detach(&mut self, path: &NodePath) -> usize {
        let Some(set) = self.adjacency.get_mut(path) else {
            return 0;
        };
        let former: Vec<NodePath> = set.drain().collect();
        for other in &former {
            if let Some(back) = self.adjacency.get_mut(other) {
                back.remove(path);
            }
        }
        former.len()
    }

    fn edge_count(&self) -> usize {
        let mut ends = 0;
        for (path, set) in &self.adjacency {
            for other in set {
                // A self-loop is a single entry but still two edge ends
                ends += if other == path { 2 } else { 1 };
            }
        }
        ends / 2
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.next_seq = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================
