//! # docscout
//!
//! Keyword search and AI summarization over a cloud document store.
//!
//! docscout has two halves: a small HTTP gateway that authenticates
//! against a document-store API and exposes search and content-extraction
//! endpoints, and a conversational front end that turns free-text queries
//! into keyword searches, deduplicates the results, lets the user pick
//! documents, and summarizes their content through an external
//! text-generation service.
//!
//! ## Architecture
//!
//! ```text
//! user text ──▶ planner ──▶ aggregate ──▶ session ──▶ summarize
//!                              │                          │
//!                              ▼                          ▼
//!                        ┌──────────┐              ┌────────────┐
//!                        │ gateway  │◀─────────────│  gateway   │
//!                        │ /search  │   /content   │  client    │
//!                        └────┬─────┘              └────────────┘
//!                             ▼
//!                   ┌──────────────────┐
//!                   │  document store  │──▶ extract (txt/docx/pdf)
//!                   └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export DOCSCOUT_STORE_TOKEN=...      # document-store credential
//! docscout serve                        # start the gateway
//! export DOCSCOUT_MODEL_API_KEY=...    # text-generation credential
//! docscout chat                         # interactive search + summarize
//! docscout search "patient data"        # one-shot search
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and wire formats |
//! | [`extract`] | Multi-format text extraction (plain text, docx, PDF) |
//! | [`store`] | Document-store REST client |
//! | [`gateway`] | Search/content HTTP service |
//! | [`planner`] | Keyword splitting with stop-word filtering |
//! | [`client`] | Gateway HTTP client |
//! | [`aggregate`] | Per-keyword search, dedup, result capping |
//! | [`session`] | Per-conversation state machine |
//! | [`summarize`] | Document summarization via text generation |
//! | [`chat`] | Interactive REPL front end |

pub mod aggregate;
pub mod chat;
pub mod client;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod models;
pub mod planner;
pub mod session;
pub mod store;
pub mod summarize;
