//! Thread-shareable session handle.
//!
//! `SharedDoiGraph` is a cheap-to-clone `Arc<RwLock<DoiGraph>>`. File reads
//! and whole-tree scans run without the lock held; only the final store
//! mutation takes the write lock, so queries keep flowing during a save or
//! a rescan.

use std::path::Path;
use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::RwLock;
use tracing::info;

use crate::incremental::Outcome;
use crate::model::{Activity, FileNode, FsChange, NodePath};
use crate::scan::{ScanStats, Scanner};
use crate::storage::{GraphStore, MemoryStore};
use crate::{root_error, DoiConfig, DoiGraph, Result};

pub struct SharedDoiGraph<S: GraphStore = MemoryStore> {
    inner: Arc<RwLock<DoiGraph<S>>>,
}

impl<S: GraphStore> Clone for SharedDoiGraph<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl SharedDoiGraph<MemoryStore> {
    pub async fn initialize(root: impl AsRef<Path>, config: DoiConfig) -> Result<Self> {
        Ok(Self::new(DoiGraph::initialize(root, config).await?))
    }
}

impl<S: GraphStore> SharedDoiGraph<S> {
    pub fn new(graph: DoiGraph<S>) -> Self {
        Self { inner: Arc::new(RwLock::new(graph)) }
    }

    pub fn record(&self, path: impl AsRef<Path>, activity: Activity) -> usize {
        self.inner.write().record(path, activity)
    }

    pub fn record_edit(&self, path: impl AsRef<Path>) -> usize {
        self.record(path, Activity::Edit)
    }

    pub fn record_navigation(&self, path: impl AsRef<Path>) -> usize {
        self.record(path, Activity::Navigate)
    }

    pub fn notify_file_created(&self, path: impl AsRef<Path>) -> Outcome {
        self.inner.write().notify_file_created(path)
    }

    pub fn notify_file_deleted(&self, path: impl AsRef<Path>) -> Outcome {
        self.inner.write().notify_file_deleted(path)
    }

    pub fn notify_file_renamed(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Outcome {
        self.inner.write().notify_file_renamed(from, to)
    }

    /// Save signal. The file is read before the write lock is taken; the
    /// node is re-checked under the lock, so a delete that lands during the
    /// read wins.
    pub async fn persist_dependencies(&self, path: impl AsRef<Path>) -> Outcome {
        let (tree, normalizer, scan, node) = {
            let graph = self.inner.read();
            let node = graph.normalize(path);
            (graph.tree(), graph.normalizer().clone(), graph.config().scan.clone(), node)
        };

        let scanner = Scanner::new(tree.as_ref(), &normalizer, &scan);
        if !scanner.parses(node.as_path()) {
            return self.inner.read().saved_other(&node);
        }
        let deps = scanner.read_dependencies(&node).await;
        self.inner.write().link_dependencies(&node, &deps)
    }

    pub async fn apply_change(&self, change: &FsChange) -> Outcome {
        match change {
            FsChange::Created(path) => self.notify_file_created(path),
            FsChange::Saved(path) => self.persist_dependencies(path).await,
            FsChange::Deleted(path) => self.notify_file_deleted(path),
            FsChange::Renamed { from, to } => self.notify_file_renamed(from, to),
        }
    }

    pub fn query_weight(&self, path: impl AsRef<Path>) -> f64 {
        self.inner.read().query_weight(path)
    }

    pub fn query_neighbors(&self, path: impl AsRef<Path>) -> HashSet<NodePath> {
        self.inner.read().query_neighbors(path)
    }

    pub fn query_sorted_by_weight(&self) -> Vec<FileNode> {
        self.inner.read().query_sorted_by_weight()
    }

    pub fn query_sorted_neighbors(&self, path: impl AsRef<Path>) -> Vec<FileNode> {
        self.inner.read().query_sorted_neighbors(path)
    }

    pub fn query_top(&self, n: usize) -> Vec<FileNode> {
        self.inner.read().query_top(n)
    }

    pub fn normalize(&self, path: impl AsRef<Path>) -> NodePath {
        self.inner.read().normalize(path)
    }

    pub fn config(&self) -> DoiConfig {
        self.inner.read().config().clone()
    }
}

impl<S: GraphStore + Default> SharedDoiGraph<S> {
    /// Scan into a fresh store without the lock, then swap it in.
    ///
    /// Activity recorded while the scan runs is kept for every node that
    /// survives the swap.
    pub async fn rescan(&self) -> Result<ScanStats> {
        let (tree, normalizer, scan) = {
            let graph = self.inner.read();
            (graph.tree(), graph.normalizer().clone(), graph.config().scan.clone())
        };

        let mut fresh = S::default();
        let stats = Scanner::new(tree.as_ref(), &normalizer, &scan)
            .scan(normalizer.root(), &mut fresh)
            .await
            .map_err(|e| root_error(e, normalizer.root()))?;

        let mut graph = self.inner.write();
        graph.adopt(fresh);
        info!(nodes = graph.store().node_count(), "rescan swapped in");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::scan::{DiskTree, SourceEntry, SourceTree};

    /// Disk tree whose reads, once armed, pause until released.
    #[derive(Default)]
    struct GatedTree {
        armed: AtomicBool,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SourceTree for GatedTree {
        async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
            DiskTree.list_dir(dir).await
        }

        async fn read_source(&self, path: &Path) -> io::Result<String> {
            if self.armed.load(Ordering::SeqCst) {
                self.started.notify_one();
                self.release.notified().await;
            }
            DiskTree.read_source(path).await
        }
    }

    #[tokio::test]
    async fn test_delete_during_save_read_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "import { b } from './b';").unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();

        let tree = Arc::new(GatedTree::default());
        let graph = DoiGraph::initialize_with(dir.path(), DoiConfig::default(), tree.clone(), MemoryStore::new())
            .await
            .unwrap();
        let graph = SharedDoiGraph::new(graph);
        tree.armed.store(true, Ordering::SeqCst);

        let saver = graph.clone();
        let a = dir.path().join("a.ts");
        let save = tokio::spawn(async move { saver.persist_dependencies(a).await });

        tree.started.notified().await;
        assert_eq!(graph.notify_file_deleted("a.ts"), Outcome::Removed);
        tree.release.notify_one();

        assert_eq!(save.await.unwrap(), Outcome::Untracked);
        assert!(graph.query_sorted_by_weight().iter().all(|r| r.path != graph.normalize("a.ts")));
        assert!(graph.query_neighbors("b.ts").is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_activity_is_serialized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "import { b } from './b';").unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();
        let graph = SharedDoiGraph::initialize(dir.path(), DoiConfig::default()).await.unwrap();
        let a = dir.path().join("a.ts");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let graph = graph.clone();
            let a = a.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    graph.record_navigation(&a);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 200 events of +10 then -0.05, applied one at a time
        let expected = 200.0 * (10.0 - 0.05);
        assert!((graph.query_weight(&a) - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rescan_keeps_weights_of_survivors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "").unwrap();
        std::fs::write(dir.path().join("gone.ts"), "").unwrap();
        let graph = SharedDoiGraph::initialize(dir.path(), DoiConfig::default()).await.unwrap();

        let a = dir.path().join("a.ts");
        let gone = dir.path().join("gone.ts");
        graph.record_edit(&a);
        graph.record_edit(&gone);
        let before = graph.query_weight(&a);

        std::fs::remove_file(&gone).unwrap();
        std::fs::write(dir.path().join("new.ts"), "").unwrap();
        graph.rescan().await.unwrap();

        assert_eq!(graph.query_weight(&a), before);
        assert_eq!(graph.query_weight(&gone), 0.0);
        assert_eq!(graph.query_sorted_by_weight().len(), 2);
    }
}
