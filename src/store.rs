//! Document-store client.
//!
//! Wraps a Drive-style REST API behind the [`DocumentStore`] trait: paged
//! keyword search, metadata lookup, and chunked content download. Provider
//! HTTP failures are mapped to [`StoreError`] here, at the lowest layer
//! that sees them; callers never inspect provider status codes.
//!
//! # Authentication
//!
//! Requests carry a bearer token read from the `DOCSCOUT_STORE_TOKEN`
//! environment variable. Token acquisition and refresh are the credential
//! collaborator's concern; a missing token is fatal at startup.
//!
//! # Pagination
//!
//! Search responses may carry a `nextPageToken`; the client follows it
//! only while still short of the requested result cap.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::models::FileMetadata;

/// Domain error taxonomy for the store layer.
///
/// `NotFound` and `PermissionDenied` are expected outcomes on the content
/// path; `Provider` covers transport and API failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    PermissionDenied,
    Provider(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "File not found or inaccessible"),
            StoreError::PermissionDenied => {
                write!(f, "Insufficient permissions to access file")
            }
            StoreError::Provider(msg) => write!(f, "Document store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// A file entry as the provider reports it from a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFile {
    pub id: String,
    pub name: String,
    pub media_type: String,
}

/// External document-store interface.
///
/// The gateway depends on this trait, not on the REST client, so tests
/// substitute an in-memory store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Keyword search: matching is "name contains keyword", provider-default
    /// case sensitivity, capped at `max_results`.
    async fn search(&self, keyword: &str, max_results: usize)
        -> Result<Vec<ProviderFile>, StoreError>;

    /// Fetch a file's name and media type.
    async fn get_metadata(&self, file_id: &str) -> Result<FileMetadata, StoreError>;

    /// Download a file's raw bytes. Chunk failures abort the download;
    /// there is no internal retry.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StoreError>;
}

/// [`DocumentStore`] implementation over the provider's REST API.
pub struct RestDocumentStore {
    base_url: String,
    token: String,
    client: reqwest::Client,
    chunk_bytes: usize,
}

impl RestDocumentStore {
    /// Builds the client. Fails if `DOCSCOUT_STORE_TOKEN` is not set or the
    /// base URL is missing; both are startup configuration errors.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            anyhow::bail!("store.base_url must be set to start the gateway");
        }
        let token = std::env::var("DOCSCOUT_STORE_TOKEN")
            .context("DOCSCOUT_STORE_TOKEN environment variable not set")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            client,
            chunk_bytes: config.download_chunk_bytes,
        })
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        range: Option<(usize, usize)>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut req = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token));
        if let Some((start, end)) = range {
            req = req.header("Range", format!("bytes={}-{}", start, end));
        }
        req.send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn search(
        &self,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<ProviderFile>, StoreError> {
        let url = format!("{}/files", self.base_url);
        let q = format!("name contains '{}'", escape_query(keyword));
        let mut files: Vec<ProviderFile> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = max_results - files.len();
            let page_size = remaining.to_string();
            let mut query: Vec<(&str, &str)> = vec![
                ("q", q.as_str()),
                ("fields", "files(id,name,mimeType),nextPageToken"),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let resp = self.get(&url, &query, None).await?;
            let status = resp.status().as_u16();
            if !(200..300).contains(&status) {
                let body = resp.text().await.unwrap_or_default();
                return Err(map_status(status, &body));
            }
            let json: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| StoreError::Provider(e.to_string()))?;

            let (page, next) = parse_file_list(&json)?;
            for file in page {
                if files.len() >= max_results {
                    break;
                }
                files.push(file);
            }

            match next {
                Some(token) if files.len() < max_results => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn get_metadata(&self, file_id: &str) -> Result<FileMetadata, StoreError> {
        let url = format!("{}/files/{}", self.base_url, file_id);
        let resp = self
            .get(&url, &[("fields", "name,mimeType")], None)
            .await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }
        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;
        Ok(FileMetadata {
            name: json
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
            media_type: json
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, StoreError> {
        let url = format!("{}/files/{}", self.base_url, file_id);
        let mut out: Vec<u8> = Vec::new();
        let mut start = 0usize;

        loop {
            let range = (start, start + self.chunk_bytes - 1);
            let resp = self
                .get(&url, &[("alt", "media")], Some(range))
                .await?;
            let status = resp.status().as_u16();
            // When the file size is an exact multiple of the chunk size the
            // final chunk fills completely and the next range starts past
            // EOF; a 416 there means the download is already complete.
            if status == 416 && start > 0 {
                return Ok(out);
            }
            if !(200..300).contains(&status) {
                let body = resp.text().await.unwrap_or_default();
                return Err(map_status(status, &body));
            }
            let whole_body = status == 200;
            let chunk = resp
                .bytes()
                .await
                .map_err(|e| StoreError::Provider(e.to_string()))?;

            if whole_body {
                // Provider ignored the range and sent the entire file.
                return Ok(chunk.to_vec());
            }
            let done = chunk.len() < self.chunk_bytes;
            out.extend_from_slice(&chunk);
            if done {
                return Ok(out);
            }
            start += self.chunk_bytes;
        }
    }
}

/// Maps a provider HTTP status to the domain taxonomy. This is the only
/// place provider status codes are interpreted.
fn map_status(status: u16, body: &str) -> StoreError {
    match status {
        404 => StoreError::NotFound,
        403 => StoreError::PermissionDenied,
        _ => StoreError::Provider(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(500).collect::<String>()
        )),
    }
}

/// Parses one page of the provider's file-list response.
fn parse_file_list(
    json: &serde_json::Value,
) -> Result<(Vec<ProviderFile>, Option<String>), StoreError> {
    let entries = json
        .get("files")
        .and_then(|f| f.as_array())
        .ok_or_else(|| StoreError::Provider("missing files array in response".to_string()))?;

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        if id.is_empty() {
            continue;
        }
        files.push(ProviderFile {
            id: id.to_string(),
            name: entry
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
            media_type: entry
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    let next = json
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok((files, next))
}

/// Escapes a keyword for interpolation into the provider's query
/// expression (`name contains '<kw>'`).
fn escape_query(keyword: &str) -> String {
    keyword.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_maps_to_not_found() {
        assert_eq!(map_status(404, ""), StoreError::NotFound);
        assert_eq!(
            map_status(404, "").to_string(),
            "File not found or inaccessible"
        );
    }

    #[test]
    fn status_403_maps_to_permission_denied() {
        assert_eq!(map_status(403, ""), StoreError::PermissionDenied);
        assert_eq!(
            map_status(403, "").to_string(),
            "Insufficient permissions to access file"
        );
    }

    #[test]
    fn other_statuses_map_to_provider_error_with_excerpt() {
        let long_body = "x".repeat(2000);
        match map_status(500, &long_body) {
            StoreError::Provider(msg) => {
                assert!(msg.starts_with("HTTP 500"));
                assert!(msg.len() < 600, "body should be excerpted");
            }
            other => panic!("expected Provider, got {:?}", other),
        }
    }

    #[test]
    fn escape_query_quotes_and_backslashes() {
        assert_eq!(escape_query("o'brien"), "o\\'brien");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
        assert_eq!(escape_query("plain"), "plain");
    }

    #[test]
    fn parse_file_list_reads_entries_and_token() {
        let json = serde_json::json!({
            "files": [
                {"id": "f1", "name": "notes.txt", "mimeType": "text/plain"},
                {"id": "", "name": "skipped", "mimeType": "text/plain"},
                {"id": "f2", "name": "report.pdf", "mimeType": "application/pdf"},
            ],
            "nextPageToken": "tok",
        });
        let (files, next) = parse_file_list(&json).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "f1");
        assert_eq!(files[1].media_type, "application/pdf");
        assert_eq!(next.as_deref(), Some("tok"));
    }

    #[test]
    fn parse_file_list_missing_files_is_provider_error() {
        let json = serde_json::json!({"oops": true});
        let err = parse_file_list(&json).unwrap_err();
        assert!(matches!(err, StoreError::Provider(_)));
    }
}
