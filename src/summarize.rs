//! Document summarization via an external text-generation service.
//!
//! The service itself is opaque: prompt in, text out. Failures (content
//! that cannot be fetched, or a model call that errors) are converted to
//! inline report lines so one bad document never aborts the batch.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::client::SearchService;
use crate::config::SummarizerConfig;
use crate::models::SearchHit;

/// Opaque text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// [`TextGenerator`] calling an Anthropic-style messages API.
///
/// Requires the `DOCSCOUT_MODEL_API_KEY` environment variable.
pub struct HttpTextGenerator {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpTextGenerator {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let api_key = std::env::var("DOCSCOUT_MODEL_API_KEY")
            .context("DOCSCOUT_MODEL_API_KEY environment variable not set")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Text-generation service unreachable")?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            bail!(
                "Model API error {}: {}",
                status,
                body_text.chars().take(500).collect::<String>()
            );
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .context("Invalid response from text-generation service")?;
        json.pointer("/content/0/text")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| anyhow::anyhow!("Model response missing content text"))
    }
}

/// Builds the summarization prompt from a document name and a bounded
/// content excerpt.
pub fn build_prompt(name: &str, content: &str, excerpt_chars: usize) -> String {
    let excerpt: String = content.chars().take(excerpt_chars).collect();
    format!(
        "You are an AI assistant. Summarize the following document:\n\
         - Document: {}\n\
         - Content: {}\n\
         Tasks:\n\
         - Provide a concise summary (100 words or less).\n\
         - Highlight key details (e.g., file type, purpose) if available.",
        name, excerpt
    )
}

/// Summarizes the selected documents sequentially, in selection order.
///
/// Each document yields exactly one report line: `Summary for <name>: ...`
/// on success, `Cannot summarize <name>: <reason>` when its content could
/// not be fetched or the model call failed. Lines are joined with a blank
/// line; an empty selection yields the fixed no-summaries message.
pub async fn summarize_selected(
    service: &dyn SearchService,
    generator: &dyn TextGenerator,
    selected: &[SearchHit],
    config: &SummarizerConfig,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    for hit in selected {
        let content = match service.fetch_content(&hit.location.file_id).await {
            Ok(result) => match result.error {
                Some(err) => {
                    lines.push(format!("Cannot summarize {}: {}", hit.name, err.message));
                    continue;
                }
                None => result.text,
            },
            Err(e) => {
                lines.push(format!("Cannot summarize {}: {}", hit.name, e));
                continue;
            }
        };

        let prompt = build_prompt(&hit.name, &content, config.prompt_excerpt_chars);
        match generator
            .generate(&prompt, config.max_output_tokens)
            .await
        {
            Ok(summary) => {
                lines.push(format!("Summary for {}: {}", hit.name, summary.trim()));
            }
            Err(e) => {
                lines.push(format!("Cannot summarize {}: {}", hit.name, e));
            }
        }
    }

    if lines.is_empty() {
        "No summaries generated.".to_string()
    } else {
        lines.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentErrorKind, ContentResult, DocumentLocation};
    use std::collections::HashMap;

    struct FakeContentService {
        /// file_id -> content result; missing id means gateway failure.
        contents: HashMap<String, ContentResult>,
    }

    #[async_trait]
    impl SearchService for FakeContentService {
        async fn search_keyword(&self, _keyword: &str) -> Result<Vec<SearchHit>> {
            bail!("not used in these tests")
        }

        async fn fetch_content(&self, file_id: &str) -> Result<ContentResult> {
            match self.contents.get(file_id) {
                Some(result) => Ok(result.clone()),
                None => bail!("Gateway unreachable at http://127.0.0.1:8000"),
            }
        }
    }

    struct FakeGenerator {
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
            if self.fail {
                bail!("Model API error 429: rate limited");
            }
            // Echo the document name back so tests can assert on it.
            let name = prompt
                .lines()
                .find(|l| l.starts_with("- Document: "))
                .map(|l| l.trim_start_matches("- Document: "))
                .unwrap_or("?");
            Ok(format!("summary of {}", name))
        }
    }

    fn hit(name: &str, id: &str) -> SearchHit {
        SearchHit {
            name: name.to_string(),
            location: DocumentLocation {
                file_id: id.to_string(),
                label: "Document Store".to_string(),
            },
            media_type: "text/plain".to_string(),
            source: "document_store".to_string(),
        }
    }

    fn config() -> SummarizerConfig {
        SummarizerConfig::default()
    }

    #[tokio::test]
    async fn failed_fetch_yields_inline_line_preserving_order() {
        let mut contents = HashMap::new();
        contents.insert("1".to_string(), ContentResult::ok("alpha text".to_string()));
        contents.insert(
            "2".to_string(),
            ContentResult::failed(ContentErrorKind::NotFound, "File not found or inaccessible"),
        );
        contents.insert("3".to_string(), ContentResult::ok("gamma text".to_string()));
        let service = FakeContentService { contents };
        let generator = FakeGenerator { fail: false };

        let selected = vec![hit("a.txt", "1"), hit("b.txt", "2"), hit("c.txt", "3")];
        let report = summarize_selected(&service, &generator, &selected, &config()).await;

        let lines: Vec<&str> = report.split("\n\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Summary for a.txt: summary of a.txt");
        assert_eq!(
            lines[1],
            "Cannot summarize b.txt: File not found or inaccessible"
        );
        assert_eq!(lines[2], "Summary for c.txt: summary of c.txt");
    }

    #[tokio::test]
    async fn model_failure_does_not_abort_the_batch() {
        let mut contents = HashMap::new();
        contents.insert("1".to_string(), ContentResult::ok("text".to_string()));
        contents.insert("2".to_string(), ContentResult::ok("text".to_string()));
        let service = FakeContentService { contents };
        let generator = FakeGenerator { fail: true };

        let selected = vec![hit("a.txt", "1"), hit("b.txt", "2")];
        let report = summarize_selected(&service, &generator, &selected, &config()).await;

        let lines: Vec<&str> = report.split("\n\n").collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Cannot summarize a.txt: Model API error"));
        assert!(lines[1].starts_with("Cannot summarize b.txt: Model API error"));
    }

    #[tokio::test]
    async fn gateway_failure_yields_inline_line() {
        let service = FakeContentService {
            contents: HashMap::new(),
        };
        let generator = FakeGenerator { fail: false };

        let report =
            summarize_selected(&service, &generator, &[hit("a.txt", "missing")], &config()).await;
        assert!(report.starts_with("Cannot summarize a.txt: Gateway unreachable"));
    }

    #[tokio::test]
    async fn empty_selection_yields_fixed_message() {
        let service = FakeContentService {
            contents: HashMap::new(),
        };
        let generator = FakeGenerator { fail: false };

        let report = summarize_selected(&service, &generator, &[], &config()).await;
        assert_eq!(report, "No summaries generated.");
    }

    #[test]
    fn prompt_excerpt_is_bounded_in_chars() {
        let content = "é".repeat(2000);
        let prompt = build_prompt("doc.txt", &content, 1000);
        let excerpt_line = prompt
            .lines()
            .find(|l| l.starts_with("- Content: "))
            .unwrap();
        let excerpt = excerpt_line.trim_start_matches("- Content: ");
        assert_eq!(excerpt.chars().count(), 1000);
    }

    #[test]
    fn prompt_names_the_document() {
        let prompt = build_prompt("report.pdf", "body", 1000);
        assert!(prompt.contains("- Document: report.pdf"));
        assert!(prompt.contains("- Content: body"));
    }
}
