//! Gateway client used by the chat front end and one-shot commands.
//!
//! The front end never talks to the document store directly; everything
//! goes through the gateway's JSON API behind the [`SearchService`] trait
//! so tests can substitute an in-memory implementation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::models::{ContentResult, SearchHit};

/// Request/response surface of the search gateway.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// `GET /search?query=<keyword>`.
    async fn search_keyword(&self, keyword: &str) -> Result<Vec<SearchHit>>;

    /// `GET /content/{file_id}`. Expected failures arrive inside the
    /// [`ContentResult`]; an `Err` here means the gateway itself failed.
    async fn fetch_content(&self, file_id: &str) -> Result<ContentResult>;
}

/// HTTP [`SearchService`] over reqwest.
pub struct HttpSearchService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSearchService {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Pulls the human-readable message out of a gateway error body,
    /// falling back to the raw body excerpt.
    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => json
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ),
        }
    }
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn search_keyword(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("query", keyword)])
            .send()
            .await
            .with_context(|| format!("Gateway unreachable at {}", self.base_url))?;

        if !resp.status().is_success() {
            bail!(Self::error_message(resp).await);
        }

        resp.json::<Vec<SearchHit>>()
            .await
            .context("Invalid search response from gateway")
    }

    async fn fetch_content(&self, file_id: &str) -> Result<ContentResult> {
        let resp = self
            .client
            .get(format!("{}/content/{}", self.base_url, file_id))
            .send()
            .await
            .with_context(|| format!("Gateway unreachable at {}", self.base_url))?;

        if !resp.status().is_success() {
            bail!(Self::error_message(resp).await);
        }

        resp.json::<ContentResult>()
            .await
            .context("Invalid content response from gateway")
    }
}
