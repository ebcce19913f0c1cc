//! Persistent configuration.
//!
//! A single JSON file in the user's home directory holds the Gist
//! credentials and sync options. Missing file means defaults; unknown
//! browsers fall back to the generic snapshot file name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::BrowserFamily;

pub const DEFAULT_FILE_NAME: &str = "BookmarkHub";
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github_token: String,
    pub gist_id: String,
    pub gist_file_name: String,
    pub github_url: String,
    /// Per-browser snapshot files (`bookmarks-<family>.json`) instead of
    /// one shared file.
    pub enable_multi_browser: bool,
    pub browser_family: BrowserFamily,
    /// Where the native bookmark tree lives on disk.
    pub store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            gist_id: String::new(),
            gist_file_name: DEFAULT_FILE_NAME.to_string(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            enable_multi_browser: false,
            browser_family: BrowserFamily::Unknown,
            store_path: None,
        }
    }
}

impl Settings {
    pub fn default_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".bookmark-hub").join("config.json"))
    }

    pub fn default_store_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home)
            .join(".bookmark-hub")
            .join("bookmarks.json"))
    }

    /// Load from `path`, or the default location when none is given. A
    /// missing file yields the defaults, same as a first run.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Config {:?} is not valid JSON", path))?;
        Ok(settings)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).with_context(|| format!("Failed to write config {:?}", path))?;
        Ok(())
    }

    /// Remote credentials must be complete before any operation starts.
    pub fn validate_remote(&self) -> Result<()> {
        if self.github_token.is_empty() {
            anyhow::bail!("Gist Token Not Found");
        }
        if self.gist_id.is_empty() {
            anyhow::bail!("Gist ID Not Found");
        }
        if self.effective_file_name().is_empty() {
            anyhow::bail!("Gist File Not Found");
        }
        Ok(())
    }

    /// The snapshot file this browser reads and writes. Multi-browser
    /// mode overrides the configured name with the family file name.
    pub fn effective_file_name(&self) -> String {
        if self.enable_multi_browser {
            self.browser_family.file_name().to_string()
        } else {
            self.gist_file_name.clone()
        }
    }
}
