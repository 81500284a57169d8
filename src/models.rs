//! Core data models shared between the gateway and the chat front end.
//!
//! These types define the wire format of the gateway's JSON API and the
//! in-memory shape of search results as they flow through aggregation,
//! selection, and summarization.

use serde::{Deserialize, Serialize};

/// Where a document lives in the store.
///
/// The file identifier and the human-readable label are kept as separate
/// fields; the combined locator string is rendered only at presentation
/// boundaries via [`DocumentLocation::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLocation {
    /// Provider file identifier, usable with the content endpoint.
    pub file_id: String,
    /// Human-readable store label (e.g. `"Document Store"`).
    pub label: String,
}

impl DocumentLocation {
    /// Renders the combined human-readable locator,
    /// e.g. `Document Store (file ID: 1a2b3c)`.
    pub fn describe(&self) -> String {
        format!("{} (file ID: {})", self.label, self.file_id)
    }
}

/// A single search result as returned by `GET /search`.
///
/// Immutable once produced. Identity for deduplication is
/// `(name, location)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub location: DocumentLocation,
    pub media_type: String,
    /// Provider tag (single provider today, e.g. `"document_store"`).
    pub source: String,
}

/// File metadata fetched from the store before content download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub media_type: String,
}

/// Machine-readable kind for an expected content-path failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentErrorKind {
    NotFound,
    PermissionDenied,
    UnsupportedType,
    ExtractionFailed,
}

/// An expected, recoverable content failure carried as data.
///
/// These are outcomes the caller must display (missing file, no
/// permission, unknown format, broken file), never service failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentError {
    pub kind: ContentErrorKind,
    pub message: String,
}

/// The body of `GET /content/{file_id}`.
///
/// On success `text` holds the extracted (and truncated) document text and
/// `error` is `None`. On an expected failure `text` is empty and `error`
/// describes what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResult {
    pub text: String,
    pub error: Option<ContentError>,
}

impl ContentResult {
    pub fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    pub fn failed(kind: ContentErrorKind, message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(ContentError {
                kind,
                message: message.into(),
            }),
        }
    }
}
