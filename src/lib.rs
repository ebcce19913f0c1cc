//! Mirror a browser bookmark tree to a GitHub Gist and restore it back.
//!
//! The core is a pure tree pipeline: a native WebExtension-shaped tree
//! is exported into a portable canonical forest, optionally
//! deduplicated, wrapped in a snapshot and pushed to a gist; the reverse
//! path rebuilds the native tree behind each browser's own root-folder
//! ids. A diff engine classifies the live tree against any stored
//! snapshot for selective reconciliation.

pub mod compare;
pub mod counter;
pub mod dedup;
pub mod export;
pub mod import;
pub mod model;
pub mod ops;
pub mod progress;
pub mod remote;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod store;

// Re-export the core pipeline for convenience
pub use compare::{compare_trees, flatten_tree, CompareOutcome, FlatBookmarkRecord, MatchKey};
pub use counter::bookmark_count;
pub use dedup::dedup_tree;
pub use export::export_tree;
pub use import::{import_tree, ImportStats};
pub use model::{BookmarkNode, BrowserFamily, NativeNode, RootFolderKind, SyncSnapshot};
