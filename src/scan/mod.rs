//! # Dependency Scanner
//!
//! Walks the source root breadth-first and fills a [`GraphStore`].
//!
//! ```text
//! queue ← [root]
//! while dir ← queue.pop_front():
//!     list dir → skip hidden, enqueue subdirs, add every file as a node
//!     read the dir's source files concurrently
//!     for each (file, content): extract → resolve → add_edge
//! ```
//!
//! The queue is explicit so stack use does not grow with tree depth.
//! Reads within one directory are fanned out; writes into the store happen
//! one at a time, after the reads of that directory complete.

pub mod imports;
pub mod source;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::model::{NodePath, PathNormalizer};
use crate::storage::GraphStore;
use crate::Result;

pub use source::{DiskTree, EntryKind, SourceEntry, SourceTree};

/// Counters reported by a completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Directories listed.
    pub directories: usize,
    /// Files registered as nodes.
    pub files: usize,
    /// Files parsed for imports.
    pub parsed: usize,
    /// Import edges added (before set deduplication).
    pub edges: usize,
    /// Directories or files that could not be read.
    pub failures: usize,
}

/// Populates a store from a source tree.
pub struct Scanner<'a> {
    tree: &'a dyn SourceTree,
    normalizer: &'a PathNormalizer,
    config: &'a ScanConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(
        tree: &'a dyn SourceTree,
        normalizer: &'a PathNormalizer,
        config: &'a ScanConfig,
    ) -> Self {
        Self { tree, normalizer, config }
    }

    /// Scan everything below `root` into `store`.
    ///
    /// Failing to list `root` itself is an error; any other unreadable
    /// directory or file is logged and skipped.
    pub async fn scan<S: GraphStore>(&self, root: &Path, store: &mut S) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut queue = VecDeque::new();

        let root_entries = self.tree.list_dir(root).await?;
        self.visit_dir(root_entries, &mut queue, store, &mut stats).await;

        while let Some(dir) = queue.pop_front() {
            let entries = match self.tree.list_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot list directory, skipping");
                    stats.failures += 1;
                    continue;
                }
            };
            self.visit_dir(entries, &mut queue, store, &mut stats).await;
        }

        info!(
            root = %root.display(),
            directories = stats.directories,
            files = stats.files,
            parsed = stats.parsed,
            edges = stats.edges,
            failures = stats.failures,
            "scan complete"
        );
        Ok(stats)
    }

    async fn visit_dir<S: GraphStore>(
        &self,
        entries: Vec<SourceEntry>,
        queue: &mut VecDeque<PathBuf>,
        store: &mut S,
        stats: &mut ScanStats,
    ) {
        stats.directories += 1;
        let mut sources: Vec<(SourceEntry, NodePath)> = Vec::new();

        for entry in entries {
            if entry.is_hidden() {
                continue;
            }
            match entry.kind {
                EntryKind::Dir => {
                    if !self.config.is_excluded_dir(&entry.name) {
                        queue.push_back(entry.path);
                    }
                }
                EntryKind::File => {
                    let node = self.normalizer.normalize(&entry.path);
                    store.add_node(&node, 0.0);
                    stats.files += 1;
                    if self.config.is_source(&entry.path) {
                        sources.push((entry, node));
                    }
                }
                EntryKind::Other => {}
            }
        }

        let contents = join_all(sources.iter().map(|(entry, _)| self.tree.read_source(&entry.path))).await;

        for ((entry, node), content) in sources.iter().zip(contents) {
            let deps = match content {
                Ok(text) => self.resolve(node, &text),
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "cannot read source, no dependencies recorded");
                    stats.failures += 1;
                    continue;
                }
            };
            stats.parsed += 1;
            stats.edges += deps.len();
            for dep in &deps {
                store.add_edge(node, dep);
            }
        }
    }

    /// Current dependencies of one file, read from the tree.
    ///
    /// A read failure is logged and reported as no dependencies.
    pub async fn read_dependencies(&self, node: &NodePath) -> Vec<NodePath> {
        match self.tree.read_source(node.as_path()).await {
            Ok(text) => self.resolve(node, &text),
            Err(e) => {
                warn!(path = %node, error = %e, "cannot read source, no dependencies recorded");
                Vec::new()
            }
        }
    }

    /// True if files at `path` are parsed for imports.
    pub fn parses(&self, path: &Path) -> bool {
        self.config.is_source(path)
    }

    /// Dependencies of `node` given its content.
    pub fn resolve(&self, node: &NodePath, content: &str) -> Vec<NodePath> {
        let deps = imports::dependencies(self.normalizer, node, content);
        debug!(path = %node, count = deps.len(), "extracted dependencies");
        deps
    }
}
