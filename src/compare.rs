//! Local/remote diff engine.
//!
//! Both trees are flattened to (title, url, path) records and every
//! record is classified as local-only, remote-only or common by a chosen
//! key (URL or title). Each side is deduplicated per key before
//! classification, first occurrence wins, so duplicate keys within one
//! side never inflate the counts.

use serde::Serialize;
use std::collections::HashSet;

use crate::model::BookmarkNode;

/// Which attribute two bookmarks must share to count as the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    Url,
    Title,
}

impl MatchKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "url" => Some(MatchKey::Url),
            "title" => Some(MatchKey::Title),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchKey::Url => "url",
            MatchKey::Title => "title",
        }
    }

    fn of<'a>(&self, record: &'a FlatBookmarkRecord) -> &'a str {
        match self {
            MatchKey::Url => &record.url,
            MatchKey::Title => &record.title,
        }
    }
}

/// One flattened bookmark. `path` is the slash-joined chain of ancestor
/// folder titles from the root kind down to (excluding) the bookmark
/// itself. Working data only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatBookmarkRecord {
    pub title: String,
    pub url: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompareOutcome {
    pub local_only: Vec<FlatBookmarkRecord>,
    pub remote_only: Vec<FlatBookmarkRecord>,
    pub common: Vec<FlatBookmarkRecord>,
}

/// Depth-first flatten. Folders contribute only a path segment; every
/// url-bearing node becomes one record in traversal order.
pub fn flatten_tree(nodes: &[BookmarkNode]) -> Vec<FlatBookmarkRecord> {
    let mut records = Vec::new();
    let mut trail: Vec<String> = Vec::new();
    walk(nodes, &mut trail, &mut records);
    records
}

fn walk(nodes: &[BookmarkNode], trail: &mut Vec<String>, out: &mut Vec<FlatBookmarkRecord>) {
    for node in nodes {
        if let Some(url) = &node.url {
            out.push(FlatBookmarkRecord {
                title: node.title.clone(),
                url: url.clone(),
                path: trail.join("/"),
            });
        } else if let Some(children) = &node.children {
            trail.push(node.title.clone());
            walk(children, trail, out);
            trail.pop();
        }
    }
}

/// Classify the two sides by `key`. For a key present on both sides the
/// local copy is the one reported, since titles and paths may differ for
/// an otherwise-matching bookmark. Output order follows each side's own
/// traversal order.
pub fn compare_trees(
    local: &[BookmarkNode],
    remote: &[BookmarkNode],
    key: MatchKey,
) -> CompareOutcome {
    let local_records = dedup_by_key(flatten_tree(local), key);
    let remote_records = dedup_by_key(flatten_tree(remote), key);

    let local_keys: HashSet<&str> = local_records.iter().map(|r| key.of(r)).collect();
    let remote_keys: HashSet<&str> = remote_records.iter().map(|r| key.of(r)).collect();

    let mut outcome = CompareOutcome::default();
    for record in &local_records {
        if remote_keys.contains(key.of(record)) {
            outcome.common.push(record.clone());
        } else {
            outcome.local_only.push(record.clone());
        }
    }
    for record in remote_records {
        if !local_keys.contains(key.of(&record)) {
            outcome.remote_only.push(record);
        }
    }
    outcome
}

/// Same first-wins policy as the tree deduplicator, applied per side on
/// the flattened records.
fn dedup_by_key(records: Vec<FlatBookmarkRecord>, key: MatchKey) -> Vec<FlatBookmarkRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key.of(record).to_string()))
        .collect()
}
