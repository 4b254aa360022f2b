//! Keyword extraction and similarity scoring for conversation recall.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Arabic function words excluded from keyword extraction.
const STOP_WORDS: &[&str] = &[
    "في",
    "من",
    "إلى",
    "على",
    "عن",
    "مع",
    "أن",
    "هذا",
    "هذه",
    "التي",
    "الذي",
];

/// Extract lowercase keywords from free text.
///
/// Splits on whitespace, drops tokens of two characters or fewer and the
/// fixed stop-word list, and deduplicates while preserving first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let token = token.to_lowercase();
        if token.chars().count() <= 2 {
            continue;
        }
        if STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        if !keywords.contains(&token) {
            keywords.push(token);
        }
    }
    keywords
}

/// Score token overlap between a keyword set and free text, in [0, 1].
///
/// The intersection size is divided by the larger of the two keyword-set
/// sizes. Max-normalized on purpose, not classic Jaccard.
pub fn calculate_similarity(keywords: &[String], text: &str) -> f64 {
    if keywords.is_empty() || text.is_empty() {
        return 0.0;
    }
    let other = extract_keywords(text);
    if other.is_empty() {
        return 0.0;
    }
    let shared = keywords
        .iter()
        .filter(|keyword| other.contains(keyword))
        .count();
    shared as f64 / keywords.len().max(other.len()) as f64
}

/// Generate a record id from the current time and a random suffix.
pub fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("{millis}-{suffix}")
}
