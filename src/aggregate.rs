//! Result aggregation: one gateway search per keyword, merged and deduped.

use std::collections::HashSet;

use crate::client::SearchService;
use crate::models::SearchHit;

/// A keyword whose search failed at the gateway level. Recorded and shown
/// to the user without aborting the remaining keywords.
#[derive(Debug, Clone)]
pub struct KeywordError {
    pub keyword: String,
    pub message: String,
}

/// The outcome of one search round across all keywords.
#[derive(Debug, Clone, Default)]
pub struct SearchRound {
    /// Deduplicated hits in keyword-submission order, then provider order.
    pub hits: Vec<SearchHit>,
    pub errors: Vec<KeywordError>,
    /// Raw per-keyword responses, kept for the debug view.
    pub debug: Vec<serde_json::Value>,
}

/// Runs one search per keyword and merges the results.
///
/// Hits are concatenated in keyword order, deduplicated by
/// `(name, location)` keeping the first occurrence, and capped at
/// `max_results` unique entries. Extra hits past the cap are dropped, not
/// an error. Per-keyword failures are recorded and later keywords still
/// run.
pub async fn run_search_round(
    service: &dyn SearchService,
    keywords: &[String],
    max_results: usize,
) -> SearchRound {
    let mut round = SearchRound::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for keyword in keywords {
        match service.search_keyword(keyword).await {
            Ok(hits) => {
                round.debug.push(serde_json::json!({
                    keyword.clone(): hits,
                }));
                for hit in hits {
                    if round.hits.len() >= max_results {
                        break;
                    }
                    let key = (hit.name.clone(), hit.location.file_id.clone());
                    if seen.insert(key) {
                        round.hits.push(hit);
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                round.debug.push(serde_json::json!({
                    keyword.clone(): { "error": message },
                }));
                round.errors.push(KeywordError {
                    keyword: keyword.clone(),
                    message,
                });
            }
        }
    }

    round
}
