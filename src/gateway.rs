//! Search gateway HTTP service.
//!
//! A read-through composition layer over [`DocumentStore`] and the text
//! extractor. No caching; every call re-fetches from the store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?query=<kw>` | Keyword search, JSON array of [`SearchHit`] |
//! | `GET`  | `/content/{file_id}` | Fetch + extract content, JSON [`ContentResult`] |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Service failures use the JSON schema:
//!
//! ```json
//! { "error": { "code": "provider_error", "message": "..." } }
//! ```
//!
//! Expected content outcomes (missing file, no permission, unsupported
//! type, broken file) are NOT failures: `/content` returns `200` with a
//! populated `error` field so the caller can display them.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! front ends.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::extract::{self, ExtractError};
use crate::models::{ContentErrorKind, ContentResult, DocumentLocation, SearchHit};
use crate::store::{DocumentStore, RestDocumentStore, StoreError};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
}

/// Builds the gateway router. Exposed separately from [`run_gateway`] so
/// tests can serve it with an in-memory store.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/content/{file_id}", get(handle_content))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the gateway against the real document store.
///
/// Fails before binding if the store client cannot be constructed (missing
/// base URL or credentials); a gateway without an authenticated store
/// serves no requests.
pub async fn run_gateway(config: &Config) -> anyhow::Result<()> {
    let store = RestDocumentStore::new(&config.store)?;
    let bind_addr = config.gateway.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
    };

    let app = router(state);
    println!("Gateway listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"provider_error"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn provider_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "provider_error".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

/// Delegates to the store's keyword search and tags hits with the
/// configured provider label and source tag. Store failures of any kind
/// surface as a 500; search has no expected-error path.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    if params.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let files = state
        .store
        .search(&params.query, state.config.search.max_results)
        .await
        .map_err(|e| provider_error(e.to_string()))?;

    let hits = files
        .into_iter()
        .map(|f| SearchHit {
            name: f.name,
            location: DocumentLocation {
                file_id: f.id,
                label: state.config.store.label.clone(),
            },
            media_type: f.media_type,
            source: state.config.store.source_tag.clone(),
        })
        .collect();

    Ok(Json(hits))
}

// ============ GET /content/{file_id} ============

/// Metadata → download → extract → truncate. Expected failures become a
/// 200 response with the `error` field set; provider failures become 500.
async fn handle_content(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<ContentResult>, AppError> {
    let meta = match state.store.get_metadata(&file_id).await {
        Ok(meta) => meta,
        Err(e) => return store_error_response(e).map(Json),
    };

    let bytes = match state.store.download(&file_id).await {
        Ok(bytes) => bytes,
        Err(e) => return store_error_response(e).map(Json),
    };

    let result = match extract::extract_text(&bytes, &meta.media_type) {
        Ok(text) => {
            ContentResult::ok(truncate_chars(text, state.config.search.content_max_chars))
        }
        Err(e) => extract_error_response(e),
    };

    Ok(Json(result))
}

/// Expected store failures (not found, permission) become structured
/// content errors; anything else is a service failure.
fn store_error_response(err: StoreError) -> Result<ContentResult, AppError> {
    match err {
        StoreError::NotFound => Ok(ContentResult::failed(
            ContentErrorKind::NotFound,
            err.to_string(),
        )),
        StoreError::PermissionDenied => Ok(ContentResult::failed(
            ContentErrorKind::PermissionDenied,
            err.to_string(),
        )),
        StoreError::Provider(_) => Err(provider_error(err.to_string())),
    }
}

/// All extraction failures are expected outcomes.
fn extract_error_response(err: ExtractError) -> ContentResult {
    match err {
        ExtractError::UnsupportedType(_) => {
            ContentResult::failed(ContentErrorKind::UnsupportedType, err.to_string())
        }
        ExtractError::Failed(_) => {
            ContentResult::failed(ContentErrorKind::ExtractionFailed, err.to_string())
        }
    }
}

/// Truncates to at most `max` characters. Char-based, not byte-based, so
/// multi-byte text never splits mid-character.
fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_shorter_text_unchanged() {
        assert_eq!(truncate_chars("hello".to_string(), 10), "hello");
        assert_eq!(truncate_chars("hello".to_string(), 5), "hello");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "äöüäöü".to_string(); // 12 bytes, 6 chars
        assert_eq!(truncate_chars(text, 3), "äöü");
    }

    #[test]
    fn truncate_empty_is_empty() {
        assert_eq!(truncate_chars(String::new(), 10), "");
    }

    #[test]
    fn not_found_becomes_content_error_not_failure() {
        let result = store_error_response(StoreError::NotFound).unwrap();
        let err = result.error.unwrap();
        assert_eq!(err.kind, ContentErrorKind::NotFound);
        assert_eq!(err.message, "File not found or inaccessible");
        assert!(result.text.is_empty());
    }

    #[test]
    fn permission_denied_becomes_content_error() {
        let result = store_error_response(StoreError::PermissionDenied).unwrap();
        assert_eq!(result.error.unwrap().kind, ContentErrorKind::PermissionDenied);
    }

    #[test]
    fn provider_failure_is_a_service_failure() {
        let err = store_error_response(StoreError::Provider("boom".to_string())).unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "provider_error");
    }

    #[test]
    fn extract_errors_map_to_expected_kinds() {
        let unsupported = extract_error_response(ExtractError::UnsupportedType(
            "application/zip".to_string(),
        ));
        assert_eq!(
            unsupported.error.unwrap().kind,
            ContentErrorKind::UnsupportedType
        );

        let failed = extract_error_response(ExtractError::Failed("broken".to_string()));
        assert_eq!(
            failed.error.unwrap().kind,
            ContentErrorKind::ExtractionFailed
        );
    }
}
