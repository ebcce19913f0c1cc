//! Duplicate bookmark removal.
//!
//! One seen-set of URL digests is shared across the whole forest, so a
//! URL bookmarked in two different folders keeps only its first
//! occurrence in depth-first order. Folders are never removed, even when
//! deduplication empties them.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::model::BookmarkNode;

/// Return a copy of the forest with duplicate-URL bookmarks removed,
/// first occurrence wins. Order-sensitive by design: which copy's title
/// survives depends on traversal order.
pub fn dedup_tree(nodes: &[BookmarkNode]) -> Vec<BookmarkNode> {
    let mut seen = HashSet::new();
    walk(nodes, &mut seen)
}

fn walk(nodes: &[BookmarkNode], seen: &mut HashSet<String>) -> Vec<BookmarkNode> {
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(url) = &node.url {
            if seen.insert(url_digest(url)) {
                kept.push(node.clone());
            }
        } else if let Some(children) = &node.children {
            kept.push(BookmarkNode {
                title: node.title.clone(),
                url: None,
                children: Some(walk(children, seen)),
            });
        } else {
            // Neither url nor children (separators) pass through as-is.
            kept.push(node.clone());
        }
    }
    kept
}

fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
