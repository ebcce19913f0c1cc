//! Native tree → canonical tree transform.
//!
//! Relabels the browser's standard root folders to their portable kind
//! names and strips every browser-local field, leaving a pure data tree
//! that any supported browser can re-import.

use crate::model::{BookmarkNode, NativeNode, RootFolderKind};

/// Convert the native tree (rooted at the browser's single top node) into
/// the canonical forest stored inside a snapshot.
///
/// Root folders are recognized by native id against both vocabularies and
/// get their title rewritten to the kind label; unrecognized top-level
/// ids pass through untouched. Kinds the browser has no native folder for
/// (Chromium lacks a distinct menu root) are appended as empty folders so
/// every snapshot carries all four slots.
pub fn export_tree(root: &NativeNode) -> Vec<BookmarkNode> {
    let mut forest = Vec::new();

    if let Some(children) = &root.children {
        for child in children {
            let mut node = strip(child);
            if let Some(kind) = RootFolderKind::from_native_id(&child.id) {
                node.title = kind.label().to_string();
            }
            forest.push(node);
        }
    }

    for kind in RootFolderKind::ALL {
        if !forest.iter().any(|node| node.title == kind.label()) {
            forest.push(BookmarkNode::folder(kind.label(), vec![]));
        }
    }

    forest
}

/// Drop every transient field, keeping title, url and the child list.
/// Empty child lists are preserved, not collapsed.
fn strip(node: &NativeNode) -> BookmarkNode {
    BookmarkNode {
        title: node.title.clone(),
        url: node.url.clone(),
        children: node
            .children
            .as_ref()
            .map(|children| children.iter().map(strip).collect()),
    }
}
