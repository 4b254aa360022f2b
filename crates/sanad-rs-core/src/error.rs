//! Error types for the assistant core.

use crate::generate::GenerateError;
use thiserror::Error;

/// Errors raised at the assistant's internal seams.
///
/// The conversation flow never propagates these to the presentation
/// layer; they are rendered as transcript messages and the assistant
/// returns to the initial stage.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No clarification questions could be derived for a label.
    #[error("no clarification questions for document type: {0}")]
    NoQuestions(String),
    /// Generation collaborator failure.
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
