//! Where the scanner gets directory listings and file contents from.

use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

/// Kind of a directory entry. Symlinks are reported as `Other` and skipped,
/// so a linked directory can never loop the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    /// Dotfiles and dot-directories (`.git`, `.env`, ...).
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Async access to a source tree.
#[async_trait]
pub trait SourceTree: Send + Sync {
    /// List a directory in the order the underlying source yields entries.
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Read a file as text. Invalid UTF-8 sequences are replaced, not fatal.
    async fn read_source(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem, through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskTree;

#[async_trait]
impl SourceTree for DiskTree {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut reader = tokio::fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            let Some(kind) = entry_kind(entry.file_type().await, &path) else {
                continue;
            };
            entries.push(SourceEntry {
                path,
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }

    async fn read_source(&self, path: &Path) -> io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Classify a listed entry. An entry that can no longer be stat'ed (removed
/// since the listing) is logged and dropped.
fn entry_kind(file_type: io::Result<FileType>, path: &Path) -> Option<EntryKind> {
    match file_type {
        Ok(t) if t.is_dir() => Some(EntryKind::Dir),
        Ok(t) if t.is_file() => Some(EntryKind::File),
        Ok(_) => Some(EntryKind::Other),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot stat entry, skipping");
            None
        }
    }
}
