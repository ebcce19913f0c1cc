//! Canonical tree → native store rebuild.
//!
//! Walks the snapshot forest in order and recreates it through the store
//! capability. Nodes titled with a root-kind label are routing markers:
//! their children are re-parented onto the target scheme's native root id
//! and the marker itself is never created. One bad node never blocks the
//! rest of the tree.

use tracing::{debug, warn};

use crate::model::{BookmarkNode, IdScheme, RootFolderKind};
use crate::store::{BookmarkStore, CreateDetail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub created: usize,
    pub skipped: usize,
}

impl ImportStats {
    fn absorb(&mut self, other: ImportStats) {
        self.created += other.created;
        self.skipped += other.skipped;
    }
}

/// Recreate `nodes` under `parent_id`, in input order. Re-running against
/// a non-empty target duplicates nodes; clearing first is the caller's
/// job. Children are only submitted after their parent's create returned
/// the real assigned id, so order and nesting survive as a side effect of
/// sequential insertion.
pub fn import_tree(
    nodes: &[BookmarkNode],
    scheme: IdScheme,
    parent_id: &str,
    store: &mut dyn BookmarkStore,
) -> ImportStats {
    let mut stats = ImportStats::default();

    for node in nodes {
        if let Some(kind) = RootFolderKind::from_label(&node.title) {
            let target = kind.native_id(scheme);
            debug!("Routing {} children into native folder {}", node.title, target);
            if let Some(children) = &node.children {
                stats.absorb(import_tree(children, scheme, target, store));
            }
            continue;
        }

        match store.create(CreateDetail {
            parent_id: parent_id.to_string(),
            title: node.title.clone(),
            url: node.url.clone(),
        }) {
            Ok(created) => {
                stats.created += 1;
                if let Some(children) = &node.children {
                    if !children.is_empty() {
                        stats.absorb(import_tree(children, scheme, &created.id, store));
                    }
                }
            }
            Err(err) => {
                // Skip just this node; siblings and other branches continue.
                warn!("⚠️  Skipping bookmark \"{}\": {}", node.title, err);
                stats.skipped += 1;
            }
        }
    }

    stats
}
