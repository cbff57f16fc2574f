//! # File Graph Model
//!
//! Plain DTOs shared by the scanner, store, engine and query layer.
//!
//! Design rule: this module is pure data: no I/O and no async.

pub mod path;
pub mod node;
pub mod activity;

pub use path::{NodePath, PathNormalizer};
pub use node::FileNode;
pub use activity::{Activity, FsChange};
