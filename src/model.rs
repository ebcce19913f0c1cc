use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Root node id of a Gecko-family bookmark tree. Chromium trees use "0".
pub const GECKO_ROOT_ID: &str = "root________";

/// Portable, browser-agnostic bookmark node. Presence of `url` marks a
/// leaf; presence of `children` marks a folder. Child order is the
/// display order and survives the whole export/import cycle, including
/// empty child lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn bookmark(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }
}

/// Browser-side bookmark node as the WebExtension API reports it. The
/// extra fields are browser-local and get dropped by the exporter; the
/// importer assigns fresh parent ids and never trusts the ones found
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_group_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmodifiable: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NativeNode>>,
}

/// The two native root-id vocabularies in the wild: Gecko browsers use
/// long literal string ids, Chromium browsers use short numeric strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    Gecko,
    Chromium,
}

impl IdScheme {
    /// The "unfiled" slot of the scheme, used as the routing fallback for
    /// nodes that carry no recognizable root marker.
    pub fn unfiled_id(&self) -> &'static str {
        RootFolderKind::UnfiledFolder.native_id(*self)
    }
}

/// The four standard bookmark roots every supported browser exposes.
/// Canonical trees store the kind label as the node title, never a
/// native id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootFolderKind {
    ToolbarFolder,
    MenuFolder,
    UnfiledFolder,
    MobileFolder,
}

impl RootFolderKind {
    pub const ALL: [RootFolderKind; 4] = [
        RootFolderKind::ToolbarFolder,
        RootFolderKind::MenuFolder,
        RootFolderKind::UnfiledFolder,
        RootFolderKind::MobileFolder,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RootFolderKind::ToolbarFolder => "ToolbarFolder",
            RootFolderKind::MenuFolder => "MenuFolder",
            RootFolderKind::UnfiledFolder => "UnfiledFolder",
            RootFolderKind::MobileFolder => "MobileFolder",
        }
    }

    pub fn from_label(title: &str) -> Option<Self> {
        match title {
            "ToolbarFolder" => Some(RootFolderKind::ToolbarFolder),
            "MenuFolder" => Some(RootFolderKind::MenuFolder),
            "UnfiledFolder" => Some(RootFolderKind::UnfiledFolder),
            "MobileFolder" => Some(RootFolderKind::MobileFolder),
            _ => None,
        }
    }

    /// Membership test against both id vocabularies. Chromium has no
    /// distinct menu root; its "2" resolves to the unfiled kind.
    pub fn from_native_id(id: &str) -> Option<Self> {
        match id {
            "1" | "toolbar_____" => Some(RootFolderKind::ToolbarFolder),
            "menu________" => Some(RootFolderKind::MenuFolder),
            "2" | "unfiled_____" => Some(RootFolderKind::UnfiledFolder),
            "3" | "mobile______" => Some(RootFolderKind::MobileFolder),
            _ => None,
        }
    }

    /// Native id of this kind under the given scheme. Chromium routes
    /// both the menu and unfiled kinds into "2" (its "other bookmarks"
    /// slot) — a lossy collapse the wire format inherits and keeps.
    pub fn native_id(&self, scheme: IdScheme) -> &'static str {
        match scheme {
            IdScheme::Gecko => match self {
                RootFolderKind::ToolbarFolder => "toolbar_____",
                RootFolderKind::MenuFolder => "menu________",
                RootFolderKind::UnfiledFolder => "unfiled_____",
                RootFolderKind::MobileFolder => "mobile______",
            },
            IdScheme::Chromium => match self {
                RootFolderKind::ToolbarFolder => "1",
                RootFolderKind::MenuFolder | RootFolderKind::UnfiledFolder => "2",
                RootFolderKind::MobileFolder => "3",
            },
        }
    }
}

/// Browser family tag carried inside each snapshot and used to pick the
/// per-browser file name in multi-browser mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    Firefox,
    Chrome,
    Edge,
    Safari,
    #[default]
    Unknown,
}

impl BrowserFamily {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserFamily::Firefox => "firefox",
            BrowserFamily::Chrome => "chrome",
            BrowserFamily::Edge => "edge",
            BrowserFamily::Safari => "safari",
            BrowserFamily::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "firefox" => Some(BrowserFamily::Firefox),
            "chrome" => Some(BrowserFamily::Chrome),
            "edge" => Some(BrowserFamily::Edge),
            "safari" => Some(BrowserFamily::Safari),
            "unknown" => Some(BrowserFamily::Unknown),
            _ => None,
        }
    }

    /// Only Gecko browsers use the long-id vocabulary; everything else
    /// falls into the Chromium branch, matching how the live trees look.
    pub fn id_scheme(&self) -> IdScheme {
        match self {
            BrowserFamily::Firefox => IdScheme::Gecko,
            _ => IdScheme::Chromium,
        }
    }

    /// Snapshot file name for this family in multi-browser mode.
    pub fn file_name(&self) -> &'static str {
        match self {
            BrowserFamily::Firefox => "bookmarks-firefox.json",
            BrowserFamily::Chrome => "bookmarks-chrome.json",
            BrowserFamily::Edge => "bookmarks-edge.json",
            BrowserFamily::Safari => "bookmarks-safari.json",
            BrowserFamily::Unknown => "bookmarks.json",
        }
    }

    /// One root-id sniff of the live tree. Resolved once at startup and
    /// passed around explicitly from there on.
    pub fn detect(root: &NativeNode) -> Self {
        if root.id == GECKO_ROOT_ID {
            BrowserFamily::Firefox
        } else {
            BrowserFamily::Chrome
        }
    }
}

impl std::fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialized sync payload: the canonical forest plus metadata. The wire
/// keys are fixed (`version`, `createDate`, `bookmarks`, `browser`,
/// `browserType`) so snapshots stay readable across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub version: String,
    pub create_date: i64,
    #[serde(default)]
    pub bookmarks: Vec<BookmarkNode>,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub browser_type: BrowserFamily,
}

impl SyncSnapshot {
    pub fn new(bookmarks: Vec<BookmarkNode>, browser: String, browser_type: BrowserFamily) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            create_date: Utc::now().timestamp_millis(),
            bookmarks,
            browser,
            browser_type,
        }
    }
}

/// One snapshot file found in the Gist, as shown by the `files` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_name: String,
    pub bookmark_count: usize,
}
