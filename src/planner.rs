//! Query planner: turns free-text user queries into search keywords.

/// Splits a query into lower-cased keywords, dropping stop words.
///
/// If every token is a stop word, falls back to a single keyword: the whole
/// trimmed, lower-cased query. An entirely blank query yields no keywords.
pub fn split_keywords(query: &str, stop_words: &[String]) -> Vec<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let keywords: Vec<String> = trimmed
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| !stop_words.iter().any(|s| s == w))
        .collect();

    if keywords.is_empty() {
        vec![trimmed.to_lowercase()]
    } else {
        keywords
    }
}
