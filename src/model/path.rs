//! Node identity: normalized absolute file paths.
//!
//! Every key in the node table and the adjacency table is a [`NodePath`], and
//! the only way to obtain one is through a [`PathNormalizer`]. That makes the
//! normalization rule part of the type contract instead of a string check
//! scattered across call sites:
//!
//! 1. relative paths are resolved against the project root,
//! 2. `.` and `..` components are folded lexically (the file need not exist),
//! 3. a path without an extension gets the project's default source extension.
//!
//! Rule 3 collapses `./util` and `./util.ts` onto the same node.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Normalized absolute path identifying one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodePath(PathBuf);

impl NodePath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory holding this file. Import references resolve against it.
    pub fn parent(&self) -> Option<&Path> {
        self.0.parent()
    }

    /// True if this node lives somewhere below `dir`.
    pub fn is_within(&self, dir: &Path) -> bool {
        self.0.starts_with(dir)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for NodePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Canonicalizes file references into [`NodePath`]s.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    root: PathBuf,
    default_extension: String,
}

impl PathNormalizer {
    /// `root` anchors relative paths; `default_extension` may be given with or
    /// without its leading dot.
    pub fn new(root: impl Into<PathBuf>, default_extension: impl AsRef<str>) -> Self {
        Self {
            root: fold_components(&root.into()),
            default_extension: default_extension.as_ref().trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    /// Normalize an arbitrary file reference.
    pub fn normalize(&self, path: impl AsRef<Path>) -> NodePath {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        NodePath(self.with_default_extension(fold_components(&absolute)))
    }

    /// Resolve an import reference relative to the importing file.
    ///
    /// A reference starting with `/` replaces the base entirely.
    pub fn resolve_import(&self, importer: &NodePath, reference: &str) -> NodePath {
        let base = importer.parent().unwrap_or(&self.root);
        self.normalize(base.join(reference))
    }

    fn with_default_extension(&self, mut path: PathBuf) -> PathBuf {
        if path.extension().is_none() && !self.default_extension.is_empty() {
            path.set_extension(&self.default_extension);
        }
        path
    }
}

/// Lexically fold `.` and `..` without touching the filesystem.
fn fold_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
