//! Native bookmark store access.
//!
//! The importer and the clear operation only need a narrow capability:
//! read the root tree, create a node under a known parent, remove a
//! subtree. `BookmarkStore` is that seam; `TreeStore` is the file-backed
//! implementation this tool ships (a saved WebExtension-shaped tree),
//! where a live browser store would plug in otherwise.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::model::{IdScheme, NativeNode, GECKO_ROOT_ID};

/// What the importer submits for one node. Built fresh per node; the
/// canonical input tree is never mutated.
#[derive(Debug, Clone)]
pub struct CreateDetail {
    pub parent_id: String,
    pub title: String,
    pub url: Option<String>,
}

pub trait BookmarkStore {
    fn root(&self) -> &NativeNode;

    /// Create a node and return it with its real assigned id. Creation
    /// must complete before any child of the node is submitted.
    fn create(&mut self, detail: CreateDetail) -> Result<NativeNode>;

    /// Remove the node with the given id and everything under it.
    fn remove_subtree(&mut self, id: &str) -> Result<()>;
}

/// JSON-file-backed bookmark tree with the standard roots of one id
/// scheme. Assigns fresh ids on create and writes a `.backup` copy of
/// the previous file before persisting.
pub struct TreeStore {
    root: NativeNode,
    path: Option<PathBuf>,
}

impl TreeStore {
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bookmark store {:?}", path))?;
        let root: NativeNode = serde_json::from_str(&data)
            .with_context(|| format!("Bookmark store {:?} is not a valid tree", path))?;
        debug!("Opened bookmark store at {:?}", path);
        Ok(Self {
            root,
            path: Some(path.to_path_buf()),
        })
    }

    /// A fresh tree holding only the standard roots of the scheme.
    pub fn fresh(scheme: IdScheme) -> Self {
        let (root_id, slots): (&str, &[(&str, &str)]) = match scheme {
            IdScheme::Gecko => (
                GECKO_ROOT_ID,
                &[
                    ("menu________", "Bookmarks Menu"),
                    ("toolbar_____", "Bookmarks Toolbar"),
                    ("unfiled_____", "Other Bookmarks"),
                    ("mobile______", "Mobile Bookmarks"),
                ],
            ),
            IdScheme::Chromium => (
                "0",
                &[
                    ("1", "Bookmarks bar"),
                    ("2", "Other bookmarks"),
                    ("3", "Mobile bookmarks"),
                ],
            ),
        };

        let children = slots
            .iter()
            .enumerate()
            .map(|(index, (id, title))| NativeNode {
                id: id.to_string(),
                parent_id: Some(root_id.to_string()),
                index: Some(index as u32),
                title: title.to_string(),
                node_type: Some("folder".to_string()),
                children: Some(vec![]),
                ..Default::default()
            })
            .collect();

        Self {
            root: NativeNode {
                id: root_id.to_string(),
                node_type: Some("folder".to_string()),
                children: Some(children),
                ..Default::default()
            },
            path: None,
        }
    }

    /// Wrap an existing tree without a backing file. Used by tests and by
    /// dry runs that must not touch disk.
    pub fn from_root(root: NativeNode) -> Self {
        Self { root, path: None }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn find(&self, id: &str) -> Option<&NativeNode> {
        find_node(&self.root, id)
    }

    /// Write the tree back to its file, keeping a `.backup` copy of the
    /// previous contents. A store without a path persists nowhere.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if path.exists() {
            let backup = path.with_extension("json.backup");
            std::fs::copy(path, &backup)
                .with_context(|| format!("Failed to back up bookmark store to {:?}", backup))?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.root)?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write bookmark store {:?}", path))?;
        debug!("Persisted bookmark store to {:?}", path);
        Ok(())
    }
}

impl BookmarkStore for TreeStore {
    fn root(&self) -> &NativeNode {
        &self.root
    }

    fn create(&mut self, detail: CreateDetail) -> Result<NativeNode> {
        if let Some(url) = &detail.url {
            // Places queries cannot be recreated through the bookmarks API.
            if url.starts_with("place:") {
                anyhow::bail!("URL scheme not allowed: {}", url);
            }
        }

        let parent = find_node_mut(&mut self.root, &detail.parent_id)
            .with_context(|| format!("Parent folder {} not found", detail.parent_id))?;
        let children = parent.children.get_or_insert_with(Vec::new);

        let node = NativeNode {
            id: Uuid::new_v4().to_string(),
            parent_id: Some(detail.parent_id.clone()),
            index: Some(children.len() as u32),
            title: detail.title,
            node_type: Some(if detail.url.is_some() {
                "bookmark".to_string()
            } else {
                "folder".to_string()
            }),
            children: if detail.url.is_none() {
                Some(vec![])
            } else {
                None
            },
            url: detail.url,
            date_added: Some(Utc::now().timestamp_millis()),
            ..Default::default()
        };
        children.push(node.clone());
        Ok(node)
    }

    fn remove_subtree(&mut self, id: &str) -> Result<()> {
        if remove_node(&mut self.root, id) {
            Ok(())
        } else {
            anyhow::bail!("Bookmark node {} not found", id)
        }
    }
}

fn find_node<'a>(node: &'a NativeNode, id: &str) -> Option<&'a NativeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .as_ref()?
        .iter()
        .find_map(|child| find_node(child, id))
}

fn find_node_mut<'a>(node: &'a mut NativeNode, id: &str) -> Option<&'a mut NativeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .as_mut()?
        .iter_mut()
        .find_map(|child| find_node_mut(child, id))
}

fn remove_node(node: &mut NativeNode, id: &str) -> bool {
    let Some(children) = node.children.as_mut() else {
        return false;
    };
    if let Some(pos) = children.iter().position(|child| child.id == id) {
        children.remove(pos);
        return true;
    }
    children.iter_mut().any(|child| remove_node(child, id))
}
