//! Error types for memory operations.

/// Errors returned by the key-value slot and internal store helpers.
///
/// These never cross the `ConversationMemory` boundary: the store logs them
/// and degrades to empty results or no-op writes.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Slot rejected the write.
    #[error("slot error: {0}")]
    Slot(String),
}
