use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

/// Document-store provider settings. Credentials come from the
/// `DOCSCOUT_STORE_TOKEN` environment variable, never from this file.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the provider's REST API (required for `serve`).
    #[serde(default)]
    pub base_url: String,
    /// Human-readable label used when rendering result locations.
    #[serde(default = "default_label")]
    pub label: String,
    /// Provider tag attached to every search hit.
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Size of each ranged download request.
    #[serde(default = "default_chunk_bytes")]
    pub download_chunk_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            label: default_label(),
            source_tag: default_source_tag(),
            timeout_secs: default_timeout_secs(),
            download_chunk_bytes: default_chunk_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Address the gateway binds to (`serve`).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Gateway URL the chat front end and one-shot commands talk to.
    #[serde(default = "default_gateway_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            url: default_gateway_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Cap on unique results per search round.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Extracted text is truncated to this many characters by the gateway.
    #[serde(default = "default_content_max_chars")]
    pub content_max_chars: usize,
    /// Tokens dropped when splitting a query into keywords.
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            content_max_chars: default_content_max_chars(),
            stop_words: default_stop_words(),
        }
    }
}

/// Text-generation service settings. The API key comes from the
/// `DOCSCOUT_MODEL_API_KEY` environment variable.
#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// How much of the document is quoted in the prompt.
    #[serde(default = "default_prompt_excerpt_chars")]
    pub prompt_excerpt_chars: usize,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_model_endpoint(),
            model: default_model(),
            prompt_excerpt_chars: default_prompt_excerpt_chars(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_label() -> String {
    "Document Store".to_string()
}
fn default_source_tag() -> String {
    "document_store".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_chunk_bytes() -> usize {
    1024 * 1024
}
fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_gateway_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_max_results() -> usize {
    5
}
fn default_content_max_chars() -> usize {
    10_000
}
fn default_stop_words() -> Vec<String> {
    ["search", "for", "find", "look"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_model_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}
fn default_prompt_excerpt_chars() -> usize {
    1_000
}
fn default_max_output_tokens() -> u32 {
    150
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    if config.search.content_max_chars == 0 {
        anyhow::bail!("search.content_max_chars must be > 0");
    }

    if config.summarizer.max_output_tokens == 0 {
        anyhow::bail!("summarizer.max_output_tokens must be > 0");
    }

    if config.store.download_chunk_bytes == 0 {
        anyhow::bail!("store.download_chunk_bytes must be > 0");
    }

    if config.gateway.bind.is_empty() {
        anyhow::bail!("gateway.bind must not be empty");
    }

    Ok(config)
}
