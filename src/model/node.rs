//! File node as seen from outside the store.

use serde::Serialize;
use super::NodePath;

/// A tracked file and its current degree-of-interest weight.
///
/// This is the plain-data row handed to presentation code by the query layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub path: NodePath,
    pub weight: f64,
}

impl FileNode {
    pub fn new(path: NodePath, weight: f64) -> Self {
        Self { path, weight }
    }
}
