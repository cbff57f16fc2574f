//! # Graph Store Trait
//!
//! This is THE contract between the weight engine, the scanner, the
//! incremental handlers and whatever holds the node/adjacency tables.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | Session-lifetime hash tables |
//!
//! ## Contract
//!
//! - Keys are [`NodePath`]s, so every key is already normalized.
//! - Weights are never negative.
//! - Adjacency is symmetric: `b ∈ neighbors(a)` ⇔ `a ∈ neighbors(b)`.
//! - Unknown paths are not errors: `weight` is 0, `neighbors` is empty.
//! - Each method is one atomic step relative to other writes; callers never
//!   observe a half-applied rename or removal sweep.

pub mod memory;

use hashbrown::HashSet;

use crate::model::{FileNode, NodePath};

pub use memory::MemoryStore;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Node table (path → weight) plus undirected adjacency table
/// (path → set of related paths).
pub trait GraphStore: Send + Sync + 'static {
    // ========================================================================
    // Node table
    // ========================================================================

    /// Register a node. Idempotent: an existing node keeps its weight.
    /// Returns true if the node was created.
    fn add_node(&mut self, path: &NodePath, initial_weight: f64) -> bool;

    /// Delete a node and purge it from every adjacency set.
    /// Returns true if it existed.
    fn remove_node(&mut self, path: &NodePath) -> bool;

    /// Relocate a node's identity, keeping weight, adjacency and insertion
    /// rank. References to `old` in other adjacency sets are rewritten.
    /// Returns false if `old` is unknown.
    fn rename_node(&mut self, old: &NodePath, new: &NodePath) -> bool;

    fn contains(&self, path: &NodePath) -> bool;

    /// Weight of a node, 0 for unknown paths.
    fn weight(&self, path: &NodePath) -> f64;

    /// Add `delta` to an existing node's weight (result clamped at 0).
    /// Returns false if the node is unknown.
    fn add_weight(&mut self, path: &NodePath, delta: f64) -> bool;

    /// Subtract `amount` from every weight, clamping at 0.
    fn decay_all(&mut self, amount: f64);

    /// All nodes in insertion order.
    fn nodes(&self) -> Vec<FileNode>;

    fn node_count(&self) -> usize;

    // ========================================================================
    // Adjacency table
    // ========================================================================

    /// Link two nodes, creating missing endpoints at weight 0.
    /// Re-adding an existing edge is a no-op.
    fn add_edge(&mut self, a: &NodePath, b: &NodePath);

    /// Neighbors of a node, empty for unknown paths.
    fn neighbors(&self, path: &NodePath) -> HashSet<NodePath>;

    /// Drop every edge touching `path`, keeping the node itself.
    /// Returns how many neighbors were detached.
    fn detach(&mut self, path: &NodePath) -> usize;

    /// Number of undirected edges.
    fn edge_count(&self) -> usize;

    /// Drop all nodes and edges.
    fn clear(&mut self);

    // ========================================================================
    // Composite operations
    // ========================================================================

    /// Replace the full adjacency set of `path` with `targets`.
    ///
    /// Default: ensure the node, detach it, then link each target.
    fn replace_neighbors(&mut self, path: &NodePath, targets: &[NodePath]) {
        self.add_node(path, 0.0);
        self.detach(path);
        for target in targets {
            self.add_edge(path, target);
        }
    }
}
