//! # Incremental Mutation Handlers
//!
//! Keep the graph consistent with the filesystem without a full rescan.
//!
//! | Change | Store operation |
//! |--------|-----------------|
//! | `Created` | `add_node` at weight 0 (imports resolved on first save) |
//! | `Saved` | re-extract, `replace_neighbors` with the fresh set (tracked files only) |
//! | `Deleted` | `remove_node` |
//! | `Renamed` | `rename_node`; imports are *not* re-resolved |
//!
//! A renamed file that moved directories keeps edges resolved against its
//! old location until its next save.
//!
//! A save never creates its own node: a file that was deleted (or never
//! registered) stays untracked, whatever its content.

use tracing::debug;

use crate::model::{FsChange, NodePath};
use crate::scan::Scanner;
use crate::storage::GraphStore;

/// What a change did to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new node was registered.
    Registered,
    /// The node already existed; nothing changed.
    AlreadyTracked,
    /// The file's adjacency was replaced with this many dependencies.
    Linked(usize),
    /// The file is tracked but not parsed for imports; its edges are untouched.
    NotSource,
    /// The node and its edges were removed.
    Removed,
    /// The node moved to its new identity.
    Relocated,
    /// The path was not tracked; nothing changed.
    Untracked,
}

/// File created. Lazy policy: no content is read until the first save.
pub fn on_created<S: GraphStore + ?Sized>(store: &mut S, path: &NodePath) -> Outcome {
    if store.add_node(path, 0.0) {
        debug!(path = %path, "file created");
        Outcome::Registered
    } else {
        Outcome::AlreadyTracked
    }
}

/// File saved with the given freshly extracted dependencies.
///
/// Replaces the file's full adjacency set; edges to imports removed from
/// the source disappear.
pub fn on_saved<S: GraphStore + ?Sized>(
    store: &mut S,
    path: &NodePath,
    dependencies: &[NodePath],
) -> Outcome {
    if !store.contains(path) {
        debug!(path = %path, "save of untracked file ignored");
        return Outcome::Untracked;
    }
    store.replace_neighbors(path, dependencies);
    debug!(path = %path, dependencies = dependencies.len(), "dependencies replaced");
    Outcome::Linked(dependencies.len())
}

/// Saved file that is not parsed for imports; its adjacency is left alone.
pub fn on_saved_other<S: GraphStore + ?Sized>(store: &S, path: &NodePath) -> Outcome {
    if store.contains(path) { Outcome::NotSource } else { Outcome::Untracked }
}

pub fn on_deleted<S: GraphStore + ?Sized>(store: &mut S, path: &NodePath) -> Outcome {
    if store.remove_node(path) {
        debug!(path = %path, "file deleted");
        Outcome::Removed
    } else {
        Outcome::Untracked
    }
}

pub fn on_renamed<S: GraphStore + ?Sized>(store: &mut S, from: &NodePath, to: &NodePath) -> Outcome {
    if store.rename_node(from, to) {
        debug!(from = %from, to = %to, "file renamed");
        Outcome::Relocated
    } else {
        Outcome::Untracked
    }
}

/// Dispatch one change, reading file content through `scanner` on save.
pub async fn apply<S: GraphStore + ?Sized>(
    store: &mut S,
    scanner: &Scanner<'_>,
    change: &FsChange,
) -> Outcome {
    let outcome = match change {
        FsChange::Created(path) => on_created(store, path),
        FsChange::Saved(path) => {
            if !scanner.parses(path.as_path()) {
                return on_saved_other(store, path);
            }
            let deps = scanner.read_dependencies(path).await;
            on_saved(store, path, &deps)
        }
        FsChange::Deleted(path) => on_deleted(store, path),
        FsChange::Renamed { from, to } => on_renamed(store, from, to),
    };
    debug!(path = %change.path(), ?outcome, "change applied");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::model::PathNormalizer;
    use crate::scan::DiskTree;
    use crate::storage::MemoryStore;

    #[test]
    fn test_created_is_lazy_and_idempotent() {
        let n = PathNormalizer::new("/proj", "ts");
        let a = n.normalize("a.ts");
        let mut store = MemoryStore::new();

        assert_eq!(on_created(&mut store, &a), Outcome::Registered);
        assert_eq!(on_created(&mut store, &a), Outcome::AlreadyTracked);
        assert!(store.neighbors(&a).is_empty());
    }

    #[test]
    fn test_deleted_and_renamed_unknown_are_untracked() {
        let n = PathNormalizer::new("/proj", "ts");
        let (a, b) = (n.normalize("a.ts"), n.normalize("b.ts"));
        let mut store = MemoryStore::new();

        assert_eq!(on_deleted(&mut store, &a), Outcome::Untracked);
        assert_eq!(on_renamed(&mut store, &a, &b), Outcome::Untracked);
    }

    #[test]
    fn test_save_never_recreates_a_deleted_node() {
        let n = PathNormalizer::new("/proj", "ts");
        let (a, b) = (n.normalize("a.ts"), n.normalize("b.ts"));
        let mut store = MemoryStore::new();
        store.add_edge(&a, &b);
        on_deleted(&mut store, &a);

        assert_eq!(on_saved(&mut store, &a, &[]), Outcome::Untracked);
        assert_eq!(on_saved(&mut store, &a, &[b.clone()]), Outcome::Untracked);
        assert!(!store.contains(&a));
        assert!(store.neighbors(&b).is_empty());
        assert_eq!(on_saved_other(&store, &a), Outcome::Untracked);
    }

    #[tokio::test]
    async fn test_apply_save_reads_current_content() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.ts"), "import { b } from './b';\nimport { c } from './c';").unwrap();

        let normalizer = PathNormalizer::new(root, "ts");
        let config = ScanConfig::default();
        let scanner = Scanner::new(&DiskTree, &normalizer, &config);
        let mut store = MemoryStore::new();
        let a = normalizer.normalize("a.ts");
        on_created(&mut store, &a);

        let outcome = apply(&mut store, &scanner, &FsChange::Saved(a.clone())).await;
        assert_eq!(outcome, Outcome::Linked(2));

        std::fs::write(root.join("a.ts"), "import { b } from './b';").unwrap();
        let outcome = apply(&mut store, &scanner, &FsChange::Saved(a.clone())).await;
        assert_eq!(outcome, Outcome::Linked(1));
        assert_eq!(store.neighbors(&a).len(), 1);
        assert!(store.neighbors(&normalizer.normalize("c.ts")).is_empty());
    }

    #[tokio::test]
    async fn test_apply_save_of_non_source_keeps_edges() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("data.json"), "{}").unwrap();

        let normalizer = PathNormalizer::new(root, "ts");
        let config = ScanConfig::default();
        let scanner = Scanner::new(&DiskTree, &normalizer, &config);
        let mut store = MemoryStore::new();
        let (a, data) = (normalizer.normalize("a.ts"), normalizer.normalize("data.json"));
        store.add_edge(&a, &data);

        let outcome = apply(&mut store, &scanner, &FsChange::Saved(data.clone())).await;
        assert_eq!(outcome, Outcome::NotSource);
        assert!(store.neighbors(&data).contains(&a));
    }
}
