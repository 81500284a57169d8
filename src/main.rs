//! # docscout CLI
//!
//! ## Usage
//!
//! ```bash
//! docscout --config ./config/docscout.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docscout serve` | Start the search gateway HTTP service |
//! | `docscout chat` | Interactive search-and-summarize chat |
//! | `docscout search "<query>"` | One-shot keyword search via the gateway |
//! | `docscout content <file-id>` | Fetch extracted text for one file |
//!
//! ## Examples
//!
//! ```bash
//! # Start the gateway (requires DOCSCOUT_STORE_TOKEN)
//! docscout serve --config ./config/docscout.toml
//!
//! # Chat against a running gateway (requires DOCSCOUT_MODEL_API_KEY)
//! docscout chat
//!
//! # Script-friendly one-shots
//! docscout search "patient data"
//! docscout content 1a2b3c
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docscout::client::{HttpSearchService, SearchService};
use docscout::{aggregate, chat, config, gateway, planner};

/// docscout: keyword search and AI summarization over a cloud document
/// store.
#[derive(Parser)]
#[command(
    name = "docscout",
    about = "Keyword search and AI summarization over a cloud document store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docscout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the search gateway HTTP service.
    ///
    /// Binds to `[gateway].bind` and serves `/search`, `/content/{id}`,
    /// and `/health`. Requires `DOCSCOUT_STORE_TOKEN` in the environment.
    Serve,

    /// Interactive chat: search, select, summarize.
    ///
    /// Talks to a running gateway at `[gateway].url`. Requires
    /// `DOCSCOUT_MODEL_API_KEY` in the environment for summarization.
    Chat,

    /// One-shot search via the gateway.
    ///
    /// Splits the query into keywords, runs one search per keyword, and
    /// prints the deduplicated result list.
    Search {
        /// The search query string.
        query: String,
    },

    /// Fetch the extracted text of a single file via the gateway.
    Content {
        /// Provider file identifier.
        file_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing config file means defaults; an invalid one is an error.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::default()
    };

    match cli.command {
        Commands::Serve => {
            gateway::run_gateway(&cfg).await?;
        }
        Commands::Chat => {
            chat::run_chat(&cfg).await?;
        }
        Commands::Search { query } => {
            run_oneshot_search(&cfg, &query).await?;
        }
        Commands::Content { file_id } => {
            run_oneshot_content(&cfg, &file_id).await?;
        }
    }

    Ok(())
}

async fn run_oneshot_search(cfg: &config::Config, query: &str) -> anyhow::Result<()> {
    let keywords = planner::split_keywords(query, &cfg.search.stop_words);
    if keywords.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let service = HttpSearchService::new(&cfg.gateway.url, cfg.gateway.timeout_secs)?;
    let round = aggregate::run_search_round(&service, &keywords, cfg.search.max_results).await;

    for err in &round.errors {
        eprintln!("Error searching for '{}': {}", err.keyword, err.message);
    }

    if round.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in round.hits.iter().enumerate() {
        println!(
            "{}. {} ({}, {})",
            i + 1,
            hit.name,
            hit.location.describe(),
            hit.media_type
        );
    }
    Ok(())
}

async fn run_oneshot_content(cfg: &config::Config, file_id: &str) -> anyhow::Result<()> {
    let service = HttpSearchService::new(&cfg.gateway.url, cfg.gateway.timeout_secs)?;
    let result = service.fetch_content(file_id).await?;

    match result.error {
        Some(err) => println!("Error: {}", err.message),
        None => println!("{}", result.text),
    }
    Ok(())
}
