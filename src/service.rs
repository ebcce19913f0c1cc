//! High-level sync operations.
//!
//! Glues settings, the gist client and the local store together: upload,
//! download, clear, local dedup, compare, count. Every mutating
//! operation passes through the operation gate first, so two syncs can
//! never interleave on the same store.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::compare::{compare_trees, CompareOutcome, MatchKey};
use crate::counter::bookmark_count;
use crate::dedup::dedup_tree;
use crate::export::export_tree;
use crate::import::{import_tree, ImportStats};
use crate::model::{BrowserFamily, FileInfo, NativeNode, SyncSnapshot};
use crate::ops::{Operation, OperationGate};
use crate::progress;
use crate::remote::{GistClient, RemoteError};
use crate::settings::Settings;
use crate::store::{BookmarkStore, TreeStore};

/// What a download should pull: an explicit gist file, another browser's
/// snapshot, or (neither) the configured default.
#[derive(Debug, Clone)]
pub enum DownloadTarget {
    File(String),
    Family(BrowserFamily),
}

/// Download is the one operation where "nothing there" is a normal
/// outcome, kept apart from errors so the caller can report it quietly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Applied { count: usize, stats: ImportStats },
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOutcome {
    pub before: usize,
    pub after: usize,
    pub applied: bool,
}

impl DedupOutcome {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

pub struct SyncService {
    settings: Settings,
    gate: OperationGate,
}

impl SyncService {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            gate: OperationGate::new(),
        }
    }

    /// Export the live tree, wrap it in a snapshot, patch the gist.
    pub async fn upload(&self, dedup: bool, dry_run: bool) -> Result<usize> {
        let _guard = self.gate.begin(Operation::Uploading)?;
        let client = self.client()?;
        let store = self.open_store()?;
        let family = self.resolve_family(store.root());

        let mut bookmarks = export_tree(store.root());
        if dedup {
            bookmarks = dedup_tree(&bookmarks);
        }
        let count = bookmark_count(&bookmarks);
        let file_name = self.snapshot_file_name(family);
        info!("📤 Uploading {} bookmarks to {}", count, file_name);

        if dry_run {
            info!("🏃 Dry run mode - no changes will be made");
            return Ok(count);
        }

        let snapshot = SyncSnapshot::new(bookmarks, browser_label(family), family);
        let content = serde_json::to_string(&snapshot)?;

        let spinner = progress::create_spinner("Updating gist...");
        match client
            .update_file(&file_name, content, format!("{} - {}", file_name, family))
            .await
        {
            Ok(()) => progress::finish_with_success(
                &spinner,
                &format!("Uploaded {} bookmarks to {}", count, file_name),
            ),
            Err(err) => {
                progress::finish_with_error(&spinner, "Upload failed");
                return Err(err.into());
            }
        }
        Ok(count)
    }

    /// Fetch a snapshot, clear the live tree, rebuild it. A missing or
    /// empty snapshot leaves the local tree untouched.
    pub async fn download(
        &self,
        target: Option<DownloadTarget>,
        dedup: bool,
    ) -> Result<DownloadOutcome> {
        let _guard = self.gate.begin(Operation::Downloading)?;
        let client = self.client()?;
        let mut store = self.open_store()?;
        let family = self.resolve_family(store.root());

        let file_name = match target {
            Some(DownloadTarget::File(name)) => name,
            Some(DownloadTarget::Family(other)) => other.file_name().to_string(),
            None => self.snapshot_file_name(family),
        };
        info!("📥 Downloading snapshot {}", file_name);

        let spinner = progress::create_spinner("Fetching snapshot...");
        let body = match client.fetch_file(&file_name).await {
            Ok(Some(body)) => {
                progress::finish_with_success(&spinner, "Snapshot fetched");
                body
            }
            Ok(None) => {
                progress::finish_with_error(&spinner, "Snapshot not found");
                warn!("⚠️  Gist file {} not found - nothing to import", file_name);
                return Ok(DownloadOutcome::NoData);
            }
            Err(RemoteError::NotFound(id)) => {
                progress::finish_with_error(&spinner, "Gist not found");
                warn!("⚠️  Gist {} not found - nothing to import", id);
                return Ok(DownloadOutcome::NoData);
            }
            Err(err) => {
                progress::finish_with_error(&spinner, "Fetch failed");
                return Err(err.into());
            }
        };

        let snapshot: SyncSnapshot = serde_json::from_str(&body)
            .with_context(|| format!("Snapshot {} is not valid JSON", file_name))?;
        if snapshot.bookmarks.is_empty() {
            warn!("⚠️  Snapshot {} carries no bookmarks - nothing to import", file_name);
            return Ok(DownloadOutcome::NoData);
        }

        let mut bookmarks = snapshot.bookmarks;
        if dedup {
            bookmarks = dedup_tree(&bookmarks);
        }

        let removed = clear_native_children(&mut store)?;
        if removed > 0 {
            info!("🧹 Cleared {} existing top-level entries", removed);
        }

        let scheme = family.id_scheme();
        let stats = import_tree(&bookmarks, scheme, scheme.unfiled_id(), &mut store);
        store.persist()?;

        let count = bookmark_count(&export_tree(store.root()));
        info!(
            "✅ Imported {} nodes ({} skipped), {} bookmarks in the tree",
            stats.created, stats.skipped, count
        );
        Ok(DownloadOutcome::Applied { count, stats })
    }

    /// Remove everything under the standard roots, roots left intact.
    pub fn clear_all(&self) -> Result<usize> {
        let _guard = self.gate.begin(Operation::Clearing)?;
        let mut store = self.open_store()?;
        let removed = clear_native_children(&mut store)?;
        store.persist()?;
        info!("✅ Removed {} top-level entries", removed);
        Ok(removed)
    }

    /// Deduplicate the live tree in place: export, dedup, rebuild.
    pub fn dedup_local(&self, dry_run: bool) -> Result<DedupOutcome> {
        let _guard = self.gate.begin(Operation::Deduplicating)?;
        let mut store = self.open_store()?;
        let family = self.resolve_family(store.root());

        let forest = export_tree(store.root());
        let before = bookmark_count(&forest);
        let deduped = dedup_tree(&forest);
        let after = bookmark_count(&deduped);

        if dry_run || before == after {
            return Ok(DedupOutcome {
                before,
                after,
                applied: false,
            });
        }

        clear_native_children(&mut store)?;
        let scheme = family.id_scheme();
        import_tree(&deduped, scheme, scheme.unfiled_id(), &mut store);
        store.persist()?;
        info!("✅ Removed {} duplicate bookmarks", before - after);
        Ok(DedupOutcome {
            before,
            after,
            applied: true,
        })
    }

    /// Diff the live tree against a remote snapshot. Read-only, so it
    /// runs outside the operation gate.
    pub async fn compare(
        &self,
        file: Option<String>,
        key: MatchKey,
    ) -> Result<(CompareOutcome, String)> {
        let client = self.client()?;
        let store = self.open_store()?;
        let family = self.resolve_family(store.root());

        let file_name = file.unwrap_or_else(|| self.snapshot_file_name(family));
        let body = client
            .fetch_file(&file_name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Gist file {} not found", file_name))?;
        let snapshot: SyncSnapshot = serde_json::from_str(&body)
            .with_context(|| format!("Snapshot {} is not valid JSON", file_name))?;

        let local = export_tree(store.root());
        Ok((compare_trees(&local, &snapshot.bookmarks, key), file_name))
    }

    pub fn local_count(&self) -> Result<usize> {
        let store = self.open_store()?;
        Ok(bookmark_count(&export_tree(store.root())))
    }

    /// Snapshot files currently stored in the gist, with their counts.
    pub async fn list_files(&self) -> Result<Vec<FileInfo>> {
        let client = self.client()?;
        let files = client
            .list_snapshot_files(&self.settings.gist_file_name)
            .await?;

        let mut infos = Vec::new();
        for (file_name, content) in files {
            let bookmark_count = match serde_json::from_str::<SyncSnapshot>(&content) {
                Ok(snapshot) => bookmark_count(&snapshot.bookmarks),
                Err(err) => {
                    warn!("⚠️  {} is not a readable snapshot: {}", file_name, err);
                    0
                }
            };
            infos.push(FileInfo {
                file_name,
                bookmark_count,
            });
        }
        Ok(infos)
    }

    fn client(&self) -> Result<GistClient> {
        self.settings.validate_remote()?;
        Ok(GistClient::new(
            &self.settings.github_url,
            &self.settings.github_token,
            &self.settings.gist_id,
        )?)
    }

    fn open_store(&self) -> Result<TreeStore> {
        let path = match &self.settings.store_path {
            Some(path) => path.clone(),
            None => Settings::default_store_path()?,
        };
        if path.exists() {
            TreeStore::open(&path)
        } else {
            info!("📁 Bookmark store {:?} missing, starting a fresh tree", path);
            Ok(TreeStore::fresh(self.settings.browser_family.id_scheme()).with_path(path))
        }
    }

    /// Configured family wins; otherwise one root-id sniff of the live
    /// tree decides, and everything downstream gets the value passed in.
    fn resolve_family(&self, root: &NativeNode) -> BrowserFamily {
        if self.settings.browser_family != BrowserFamily::Unknown {
            self.settings.browser_family
        } else {
            BrowserFamily::detect(root)
        }
    }

    fn snapshot_file_name(&self, family: BrowserFamily) -> String {
        if self.settings.enable_multi_browser {
            family.file_name().to_string()
        } else {
            self.settings.gist_file_name.clone()
        }
    }
}

/// Remove every child of each standard root folder, recursively, leaving
/// the roots themselves intact.
pub fn clear_native_children(store: &mut dyn BookmarkStore) -> Result<usize> {
    let doomed: Vec<String> = store
        .root()
        .children
        .iter()
        .flatten()
        .flat_map(|root| root.children.iter().flatten())
        .map(|node| node.id.clone())
        .collect();

    let removed = doomed.len();
    for id in doomed {
        store.remove_subtree(&id)?;
    }
    Ok(removed)
}

fn browser_label(family: BrowserFamily) -> String {
    format!(
        "bookmark-hub-sync/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        family
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdScheme;
    use crate::store::CreateDetail;

    fn seeded_store(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("bookmarks.json");
        let mut store = TreeStore::fresh(IdScheme::Gecko).with_path(path.clone());
        for (title, url) in [
            ("One", "https://one.example"),
            ("One again", "https://one.example"),
            ("Two", "https://two.example"),
        ] {
            store
                .create(CreateDetail {
                    parent_id: "toolbar_____".to_string(),
                    title: title.to_string(),
                    url: Some(url.to_string()),
                })
                .unwrap();
        }
        store.persist().unwrap();
        path
    }

    fn service_for(path: std::path::PathBuf) -> SyncService {
        let mut settings = Settings::default();
        settings.store_path = Some(path);
        settings.browser_family = BrowserFamily::Firefox;
        SyncService::new(settings)
    }

    #[test]
    fn dedup_dry_run_reports_without_mutating() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir);
        let service = service_for(path.clone());

        let outcome = service.dedup_local(true).unwrap();
        assert_eq!(outcome.before, 3);
        assert_eq!(outcome.after, 2);
        assert!(!outcome.applied);
        assert_eq!(service.local_count().unwrap(), 3);
    }

    #[test]
    fn dedup_applies_first_wins_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir);
        let service = service_for(path.clone());

        let outcome = service.dedup_local(false).unwrap();
        assert_eq!(outcome.removed(), 1);
        assert!(outcome.applied);
        assert_eq!(service.local_count().unwrap(), 2);

        let store = TreeStore::open(&path).unwrap();
        let toolbar = store.find("toolbar_____").unwrap();
        let titles: Vec<&str> = toolbar
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn clear_keeps_roots_and_drops_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir);
        let service = service_for(path.clone());

        let removed = service.clear_all().unwrap();
        assert_eq!(removed, 3);
        assert_eq!(service.local_count().unwrap(), 0);

        let store = TreeStore::open(&path).unwrap();
        assert_eq!(store.root().children.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn family_resolution_prefers_the_configured_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_store(&dir);

        let service = service_for(path.clone());
        let gecko_root = TreeStore::open(&path).unwrap();
        assert_eq!(
            service.resolve_family(gecko_root.root()),
            BrowserFamily::Firefox
        );

        let mut settings = Settings::default();
        settings.store_path = Some(path);
        let sniffing = SyncService::new(settings);
        assert_eq!(
            sniffing.resolve_family(gecko_root.root()),
            BrowserFamily::Firefox
        );
        let chromium = TreeStore::fresh(IdScheme::Chromium);
        assert_eq!(
            sniffing.resolve_family(chromium.root()),
            BrowserFamily::Chrome
        );
    }
}
