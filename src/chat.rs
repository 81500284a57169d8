//! Conversational front end.
//!
//! A stdin/stdout REPL over the [`ConversationSession`] state machine.
//! All conversation state lives in the session value; this module only
//! parses commands, drives the search/summarize flow, and renders output.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::aggregate;
use crate::client::{HttpSearchService, SearchService};
use crate::config::Config;
use crate::models::SearchHit;
use crate::planner;
use crate::session::ConversationSession;
use crate::summarize::{self, HttpTextGenerator, TextGenerator};

/// A parsed REPL input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Results,
    Debug,
    Summarize,
    /// Zero-based result index.
    Toggle(usize),
    Query(String),
    Empty,
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    match trimmed {
        "quit" | "exit" => return Command::Quit,
        "help" => return Command::Help,
        "results" => return Command::Results,
        "debug" => return Command::Debug,
        "summarize" => return Command::Summarize,
        _ => {}
    }
    if let Some(rest) = trimmed.strip_prefix("toggle ") {
        if let Ok(n) = rest.trim().parse::<usize>() {
            if n >= 1 {
                return Command::Toggle(n - 1);
            }
        }
    }
    Command::Query(trimmed.to_string())
}

/// Renders the current result list with selection checkboxes.
fn render_results(session: &ConversationSession) -> String {
    if session.results().is_empty() {
        return "No results yet. Type a query to search.".to_string();
    }
    let mut out = format!(
        "Found documents (round {}, select with `toggle N`):\n",
        session.result_version()
    );
    for (idx, hit) in session.results().iter().enumerate() {
        let mark = if session.is_selected(idx) { "x" } else { " " };
        out.push_str(&format!(
            "  [{}] {}. {} ({}, {})\n",
            mark,
            idx + 1,
            hit.name,
            hit.location.describe(),
            hit.media_type
        ));
    }
    out
}

fn render_hit_line(idx: usize, hit: &SearchHit, selected: bool) -> String {
    let mark = if selected { "selected" } else { "deselected" };
    format!("{} {} ({})", mark, hit.name, idx + 1)
}

const HELP: &str = "Commands:\n\
  <free text>   search the document store\n\
  results       show the current result list\n\
  toggle N      select/deselect result N\n\
  summarize     summarize the selected documents\n\
  debug         show raw per-keyword search responses\n\
  quit          exit";

/// Runs the interactive chat loop against a running gateway.
pub async fn run_chat(config: &Config) -> Result<()> {
    let service = HttpSearchService::new(&config.gateway.url, config.gateway.timeout_secs)?;
    let generator = HttpTextGenerator::new(&config.summarizer)?;

    println!("Document search chat. Find documents by keyword (e.g. 'patient data').");
    println!("{}", HELP);

    let mut session = ConversationSession::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print!("> ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Results => println!("{}", render_results(&session)),
            Command::Debug => {
                if session.debug_payloads().is_empty() {
                    println!("No debug results yet.");
                } else {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(session.debug_payloads())?
                    );
                }
            }
            Command::Toggle(idx) => match session.toggle(idx) {
                Some(state) => {
                    let hit = &session.results()[idx];
                    println!("{}", render_hit_line(idx, hit, state));
                }
                None => println!("No result {}.", idx + 1),
            },
            Command::Summarize => {
                handle_summarize(&mut session, &service, &generator, config).await;
            }
            Command::Query(query) => {
                handle_query(&mut session, &service, config, &query).await;
            }
        }
        print!("> ");
        std::io::stdout().flush()?;
    }

    Ok(())
}

async fn handle_query(
    session: &mut ConversationSession,
    service: &dyn SearchService,
    config: &Config,
    query: &str,
) {
    session.push_user(query);

    let keywords = planner::split_keywords(query, &config.search.stop_words);
    if keywords.is_empty() {
        println!("Please specify a keyword (e.g. 'patient data' or 'invoice').");
        return;
    }

    println!("Searching for {:?}...", keywords);
    let before = session.transcript().len();
    let round = aggregate::run_search_round(service, &keywords, config.search.max_results).await;
    session.apply_round(query, round);

    // Print only the transcript lines this round appended.
    for message in &session.transcript()[before..] {
        println!("{}", message.text);
    }
    if !session.results().is_empty() {
        println!("{}", render_results(session));
    }
}

async fn handle_summarize(
    session: &mut ConversationSession,
    service: &dyn SearchService,
    generator: &dyn TextGenerator,
    config: &Config,
) {
    let selected = session.selected_hits();
    if selected.is_empty() {
        // A warning, not a transcript entry.
        println!("Please select at least one document to summarize.");
        return;
    }

    println!("Summarizing {} documents...", selected.len());
    let report =
        summarize::summarize_selected(service, generator, &selected, &config.summarizer).await;
    session.push_assistant(format!("Summary:\n{}", report));
    println!("Summary:\n{}", report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SearchRound;
    use crate::models::DocumentLocation;

    #[test]
    fn parses_control_commands() {
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("  exit "), Command::Quit);
        assert_eq!(parse_command("results"), Command::Results);
        assert_eq!(parse_command("debug"), Command::Debug);
        assert_eq!(parse_command("summarize"), Command::Summarize);
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn toggle_is_one_based_for_the_user() {
        assert_eq!(parse_command("toggle 1"), Command::Toggle(0));
        assert_eq!(parse_command("toggle 3"), Command::Toggle(2));
        // Invalid toggles fall through to queries.
        assert_eq!(
            parse_command("toggle 0"),
            Command::Query("toggle 0".to_string())
        );
        assert_eq!(
            parse_command("toggle abc"),
            Command::Query("toggle abc".to_string())
        );
    }

    #[test]
    fn free_text_is_a_query() {
        assert_eq!(
            parse_command("find patient data"),
            Command::Query("find patient data".to_string())
        );
    }

    #[test]
    fn render_results_marks_selection() {
        let mut session = ConversationSession::new();
        session.apply_round(
            "q",
            SearchRound {
                hits: vec![SearchHit {
                    name: "a.txt".to_string(),
                    location: DocumentLocation {
                        file_id: "1".to_string(),
                        label: "Document Store".to_string(),
                    },
                    media_type: "text/plain".to_string(),
                    source: "document_store".to_string(),
                }],
                errors: Vec::new(),
                debug: Vec::new(),
            },
        );

        let unselected = render_results(&session);
        assert!(unselected.contains("[ ] 1. a.txt"));
        assert!(unselected.contains("Document Store (file ID: 1)"));
        assert!(unselected.contains("round 1"));

        session.toggle(0);
        let selected = render_results(&session);
        assert!(selected.contains("[x] 1. a.txt"));
    }

    #[test]
    fn render_results_empty_session() {
        let session = ConversationSession::new();
        assert!(render_results(&session).contains("No results yet"));
    }
}
