//! Developer activity signals and filesystem change notifications.

use serde::{Deserialize, Serialize};
use super::NodePath;

/// Kind of developer activity on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    /// Content of the file changed.
    Edit,
    /// The file became the active editor.
    Navigate,
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activity::Edit => f.write_str("edit"),
            Activity::Navigate => f.write_str("navigate"),
        }
    }
}

/// Structural change reported by the filesystem or editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsChange {
    Created(NodePath),
    Saved(NodePath),
    Deleted(NodePath),
    Renamed { from: NodePath, to: NodePath },
}

impl FsChange {
    /// The path the change lands on (the new path for renames).
    pub fn path(&self) -> &NodePath {
        match self {
            FsChange::Created(p) | FsChange::Saved(p) | FsChange::Deleted(p) => p,
            FsChange::Renamed { to, .. } => to,
        }
    }
}
