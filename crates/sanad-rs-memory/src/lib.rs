//! Conversation memory for Sanad: a bounded, best-effort log of past
//! document-drafting interactions with search, similarity recall, and
//! aggregate statistics.

pub mod error;
pub mod keywords;
pub mod model;
pub mod slot;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// Keyword extraction and similarity helpers.
pub use keywords::{calculate_similarity, extract_keywords, generate_id};
/// Record model and derived statistics.
pub use model::{
    ConversationDraft, ConversationPatch, ConversationRecord, MAX_TAGS, MemoryStats,
    ScoredConversation,
};
/// Persistence slot interface and implementations.
pub use slot::{FileKvSlot, InMemoryKvSlot, KeyValueSlot};
/// Memory interface and the key-value backed store.
pub use store::{
    ConversationMemory, DEFAULT_MAX_CONVERSATIONS, KvConversationMemory, MEMORY_KEY,
};
