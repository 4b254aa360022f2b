//! Tag extraction for saved conversation records.

use regex::Regex;
use sanad_rs_memory::MAX_TAGS;
use std::sync::OnceLock;

/// Word-token pattern, compiled once.
static TOKEN: OnceLock<Regex> = OnceLock::new();

/// Derive display tags from the concatenated answer text.
///
/// Regex word tokens, lowercased, deduplicated in first-seen order, at
/// most [`MAX_TAGS`] kept. Deliberately simpler than the memory crate's
/// `extract_keywords`: no stop-word filtering and no length cutoff.
pub fn extract_tags(text: &str) -> Vec<String> {
    let token = TOKEN.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").expect("token pattern"));
    let mut tags: Vec<String> = Vec::new();
    for found in token.find_iter(text) {
        let tag = found.as_str().to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}
