//! Gist REST client.
//!
//! One gist holds one file per sync target. The client speaks the small
//! surface the sync needs: fetch a file's content, patch it back, list
//! the snapshot files. A missing gist or file is "no data", kept apart
//! from transport and auth failures so download can abort cleanly
//! without touching the local tree.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("gist or file not found: {0}")]
    NotFound(String),
    #[error("gist request unauthorized (check the token)")]
    Unauthorized,
    #[error("gist request failed: {status} - {body}")]
    Status { status: StatusCode, body: String },
    #[error("gist transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Gist response, reduced to the file map the sync cares about. BTreeMap
/// keeps the listing order stable.
#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
    content: Option<String>,
}

pub struct GistClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    gist_id: String,
}

impl GistClient {
    pub fn new(base_url: &str, token: &str, gist_id: &str) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bookmark-hub-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            gist_id: gist_id.to_string(),
        })
    }

    /// Content of one file in the gist, or `None` when the gist exists
    /// but carries no file under that name.
    pub async fn fetch_file(&self, file_name: &str) -> Result<Option<String>, RemoteError> {
        let gist = self.fetch_gist().await?;
        match gist.files.get(file_name) {
            Some(file) => Ok(Some(self.resolve_content(file).await?)),
            None => Ok(None),
        }
    }

    /// Every snapshot file in the gist with its content. Snapshot files
    /// are the per-browser names, the generic name, and whatever name is
    /// configured as the single target.
    pub async fn list_snapshot_files(
        &self,
        configured_name: &str,
    ) -> Result<Vec<(String, String)>, RemoteError> {
        let gist = self.fetch_gist().await?;
        let mut files = Vec::new();
        for (name, file) in &gist.files {
            let is_snapshot = (name.starts_with("bookmarks-") && name.ends_with(".json"))
                || name == "bookmarks.json"
                || name == configured_name;
            if is_snapshot {
                files.push((name.clone(), self.resolve_content(file).await?));
            }
        }
        Ok(files)
    }

    /// Replace one file's content in the gist.
    pub async fn update_file(
        &self,
        file_name: &str,
        content: String,
        description: String,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/gists/{}", self.base_url, self.gist_id);
        debug!("PATCH {}", url);

        let body = serde_json::json!({
            "files": { file_name: { "content": content } },
            "description": description,
        });

        let response = self
            .http
            .patch(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn fetch_gist(&self) -> Result<GistResponse, RemoteError> {
        let url = format!("{}/gists/{}", self.base_url, self.gist_id);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        let response = self.check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Large gist files come back truncated; the full content hangs off
    /// a raw URL instead.
    async fn resolve_content(&self, file: &GistFile) -> Result<String, RemoteError> {
        if file.truncated {
            if let Some(raw_url) = &file.raw_url {
                debug!("Following raw_url for truncated file");
                let response = self.http.get(raw_url).send().await?;
                let response = self.check_status(response).await?;
                return Ok(response.text().await?);
            }
        }
        Ok(file.content.clone().unwrap_or_default())
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(self.gist_id.clone())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Status { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gist_response_parses_file_map() {
        let raw = r#"{
            "id": "abc",
            "files": {
                "BookmarkHub": { "content": "{\"bookmarks\":[]}", "truncated": false },
                "bookmarks-firefox.json": { "truncated": true, "raw_url": "https://gist.example/raw" }
            }
        }"#;
        let gist: GistResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(gist.files.len(), 2);
        assert!(gist.files["bookmarks-firefox.json"].truncated);
        assert_eq!(
            gist.files["BookmarkHub"].content.as_deref(),
            Some("{\"bookmarks\":[]}")
        );
    }

    #[test]
    fn gist_response_without_files_is_empty() {
        let gist: GistResponse = serde_json::from_str("{\"id\":\"abc\"}").unwrap();
        assert!(gist.files.is_empty());
    }
}
