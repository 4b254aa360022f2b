//! Conversation record model and derived statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of tags kept on a record.
pub const MAX_TAGS: usize = 5;

/// Persisted conversation record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Record identifier, assigned once at save time.
    pub id: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Document category label.
    pub doc_type: String,
    /// Concatenation of all user answers for the interaction.
    pub user_input: String,
    /// Drafted document text, absent until generation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_content: Option<String>,
    /// Up to [`MAX_TAGS`] keyword tags derived from the user input.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional user rating, 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// Input for [`crate::ConversationMemory::save`]; id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationDraft {
    /// Document category label.
    pub doc_type: String,
    /// Concatenation of all user answers.
    pub user_input: String,
    /// Drafted document text, if generation succeeded.
    pub generated_content: Option<String>,
    /// Keyword tags, clamped to [`MAX_TAGS`] at save.
    pub tags: Vec<String>,
}

/// Field-wise patch for [`crate::ConversationMemory::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationPatch {
    /// Replacement user input.
    pub user_input: Option<String>,
    /// Replacement generated content.
    pub generated_content: Option<String>,
    /// Replacement tag set, clamped to [`MAX_TAGS`].
    pub tags: Option<Vec<String>>,
    /// User rating, 1 to 5.
    pub rating: Option<u8>,
}

impl ConversationPatch {
    /// Patch carrying only a rating.
    pub fn rating(rating: u8) -> Self {
        Self {
            rating: Some(rating),
            ..Self::default()
        }
    }
}

/// Record plus its similarity score, as returned by
/// [`crate::ConversationMemory::get_similar`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredConversation {
    /// The matched record.
    pub record: ConversationRecord,
    /// Similarity score in [0, 1].
    pub similarity: f64,
}

/// Aggregate statistics over the store, derived on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStats {
    /// Total number of stored records.
    pub total_conversations: usize,
    /// Occurrence count per document type.
    pub doc_type_distribution: HashMap<String, usize>,
    /// Arithmetic mean of present ratings, 0.0 if none.
    pub average_rating: f64,
    /// Document type with the highest count, empty for an empty store.
    pub most_used_doc_type: String,
}
