//! # doi-graph: Degree-of-Interest Ranking for Source Files
//!
//! Scores every file of a project by how relevant it is *right now*, from two
//! inputs: the static import graph, and recent developer activity.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between engine and tables
//! 2. **Typed identity**: a `NodePath` only comes out of a `PathNormalizer`
//! 3. **Owned state**: one `DoiGraph` per session, no globals, nothing on disk
//! 4. **Presentation is a projection**: `view` reads query rows, never the store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doi_graph::{DoiConfig, DoiGraph};
//!
//! # async fn example() -> doi_graph::Result<()> {
//! let mut graph = DoiGraph::initialize("./src", DoiConfig::default()).await?;
//!
//! // Relative paths resolve against the root: this is ./src/app.ts
//! graph.record_navigation("app.ts");
//! graph.record_edit("util.ts");
//!
//! for row in graph.query_sorted_by_weight().iter().take(10) {
//!     println!("{:>8.2}  {}", row.weight, row.path);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! | Component | Module | Role |
//! |-----------|--------|------|
//! | Path Normalizer | `model::path` | stable node identity |
//! | Dependency Scanner | `scan` | BFS walk + textual import extraction |
//! | Graph Store | `storage` | node table + undirected adjacency |
//! | Weight Engine | `engine` | attenuated propagation + global decay |
//! | Mutation Handlers | `incremental` | create/save/delete/rename |
//! | Query Layer | `query` | ranked, read-only projections |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod storage;
pub mod scan;
pub mod engine;
pub mod incremental;
pub mod query;
pub mod view;
pub mod shared;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashSet;
use tracing::info;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Activity, FileNode, FsChange, NodePath, PathNormalizer};
pub use config::{BandThresholds, DoiConfig, ScanConfig, WeightConfig};
pub use storage::{GraphStore, MemoryStore};
pub use scan::{DiskTree, ScanStats, Scanner, SourceTree};
pub use engine::WeightEngine;
pub use incremental::Outcome;
pub use view::{Band, BandFilter};
pub use shared::SharedDoiGraph;

// ============================================================================
// Top-level session handle
// ============================================================================

/// The primary entry point. A `DoiGraph` owns one store for the lifetime of
/// an editor session and exposes the activity, change and query interface.
///
/// Every mutating method takes `&mut self`, so writes are serialized by
/// construction. Wrap in [`SharedDoiGraph`] to share across threads.
pub struct DoiGraph<S: GraphStore = MemoryStore> {
    store: S,
    engine: WeightEngine,
    normalizer: PathNormalizer,
    config: DoiConfig,
    tree: Arc<dyn SourceTree>,
}

impl DoiGraph<MemoryStore> {
    /// Scan `root` from disk into a fresh in-memory store.
    pub async fn initialize(root: impl AsRef<Path>, config: DoiConfig) -> Result<Self> {
        Self::initialize_with(root, config, Arc::new(DiskTree), MemoryStore::new()).await
    }
}

impl<S: GraphStore> DoiGraph<S> {
    /// Scan `root` through `tree` into `store`. Anything already in `store`
    /// is cleared first.
    ///
    /// A missing or non-directory root aborts initialization; the partially
    /// filled store is dropped, never returned.
    pub async fn initialize_with(
        root: impl AsRef<Path>,
        config: DoiConfig,
        tree: Arc<dyn SourceTree>,
        mut store: S,
    ) -> Result<Self> {
        config.validate()?;
        let root = std::path::absolute(root.as_ref())?;
        let normalizer = PathNormalizer::new(&root, &config.scan.default_extension);

        store.clear();
        let stats = Scanner::new(tree.as_ref(), &normalizer, &config.scan)
            .scan(&root, &mut store)
            .await
            .map_err(|e| root_error(e, &root))?;

        info!(
            root = %root.display(),
            nodes = store.node_count(),
            edges = store.edge_count(),
            failures = stats.failures,
            "graph initialized"
        );

        Ok(Self {
            store,
            engine: WeightEngine::new(config.weights.clone()),
            normalizer,
            config,
            tree,
        })
    }

    // ========================================================================
    // Activity
    // ========================================================================

    /// The file's content changed. Returns how many nodes were credited.
    pub fn record_edit(&mut self, path: impl AsRef<Path>) -> usize {
        self.record(path, Activity::Edit)
    }

    /// The file became the active editor. Returns how many nodes were credited.
    pub fn record_navigation(&mut self, path: impl AsRef<Path>) -> usize {
        self.record(path, Activity::Navigate)
    }

    pub fn record(&mut self, path: impl AsRef<Path>, activity: Activity) -> usize {
        let node = self.normalizer.normalize(path);
        self.engine.record(&mut self.store, &node, activity)
    }

    // ========================================================================
    // Structural changes
    // ========================================================================

    pub fn notify_file_created(&mut self, path: impl AsRef<Path>) -> Outcome {
        let node = self.normalizer.normalize(path);
        incremental::on_created(&mut self.store, &node)
    }

    pub fn notify_file_deleted(&mut self, path: impl AsRef<Path>) -> Outcome {
        let node = self.normalizer.normalize(path);
        incremental::on_deleted(&mut self.store, &node)
    }

    pub fn notify_file_renamed(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Outcome {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        incremental::on_renamed(&mut self.store, &from, &to)
    }

    /// Save signal: re-read the file and replace its edges.
    pub async fn persist_dependencies(&mut self, path: impl AsRef<Path>) -> Outcome {
        let change = FsChange::Saved(self.normalizer.normalize(path));
        self.apply_change(&change).await
    }

    /// Save signal with content supplied by the caller (e.g. an editor buffer).
    pub fn persist_dependencies_from(&mut self, path: impl AsRef<Path>, content: &str) -> Outcome {
        let node = self.normalizer.normalize(path);
        let scanner = Scanner::new(self.tree.as_ref(), &self.normalizer, &self.config.scan);
        if !scanner.parses(node.as_path()) {
            return incremental::on_saved_other(&self.store, &node);
        }
        let deps = scanner.resolve(&node, content);
        incremental::on_saved(&mut self.store, &node, &deps)
    }

    /// Dispatch any filesystem change.
    pub async fn apply_change(&mut self, change: &FsChange) -> Outcome {
        let scanner = Scanner::new(self.tree.as_ref(), &self.normalizer, &self.config.scan);
        incremental::apply(&mut self.store, &scanner, change).await
    }

    /// Install freshly extracted dependencies for `node`, if still tracked.
    pub(crate) fn link_dependencies(&mut self, node: &NodePath, deps: &[NodePath]) -> Outcome {
        incremental::on_saved(&mut self.store, node, deps)
    }

    pub(crate) fn saved_other(&self, node: &NodePath) -> Outcome {
        incremental::on_saved_other(&self.store, node)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn query_weight(&self, path: impl AsRef<Path>) -> f64 {
        query::weight(&self.store, &self.normalizer.normalize(path))
    }

    pub fn query_neighbors(&self, path: impl AsRef<Path>) -> HashSet<NodePath> {
        query::neighbors(&self.store, &self.normalizer.normalize(path))
    }

    /// Every node, heaviest first; ties keep insertion order.
    pub fn query_sorted_by_weight(&self) -> Vec<FileNode> {
        query::sorted_by_weight(&self.store)
    }

    /// Neighbors of `path`, heaviest first.
    pub fn query_sorted_neighbors(&self, path: impl AsRef<Path>) -> Vec<FileNode> {
        query::sorted_neighbors(&self.store, &self.normalizer.normalize(path))
    }

    pub fn query_top(&self, n: usize) -> Vec<FileNode> {
        query::top(&self.store, n)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Normalize a path exactly as the graph keys it.
    pub fn normalize(&self, path: impl AsRef<Path>) -> NodePath {
        self.normalizer.normalize(path)
    }

    pub fn root(&self) -> &Path {
        self.normalizer.root()
    }

    pub fn config(&self) -> &DoiConfig {
        &self.config
    }

    /// Access the underlying store (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn tree(&self) -> Arc<dyn SourceTree> {
        Arc::clone(&self.tree)
    }

    pub(crate) fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }
}

impl<S: GraphStore + Default> DoiGraph<S> {
    /// Rebuild the structure from disk, carrying weights of files that
    /// still exist over to the new graph.
    pub async fn rescan(&mut self) -> Result<ScanStats> {
        let mut fresh = S::default();
        let root = self.normalizer.root().to_path_buf();
        let stats = Scanner::new(self.tree.as_ref(), &self.normalizer, &self.config.scan)
            .scan(&root, &mut fresh)
            .await
            .map_err(|e| root_error(e, &root))?;
        self.adopt(fresh);
        Ok(stats)
    }

    /// Replace the store with `fresh`, keeping weights of surviving nodes.
    pub(crate) fn adopt(&mut self, mut fresh: S) {
        for row in self.store.nodes() {
            if row.weight > 0.0 {
                fresh.add_weight(&row.path, row.weight);
            }
        }
        self.store = fresh;
    }
}

/// Map a failure to list the root onto the user-facing root errors.
pub(crate) fn root_error(err: Error, root: &Path) -> Error {
    match err {
        Error::Io(e) if e.kind() == io::ErrorKind::NotFound => Error::RootNotFound(root.to_path_buf()),
        Error::Io(e) if e.kind() == io::ErrorKind::NotADirectory => {
            Error::NotADirectory(root.to_path_buf())
        }
        other => other,
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Project root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================
