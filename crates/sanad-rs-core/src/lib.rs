//! Assistant core for Sanad: the conversation stage machine, document
//! catalogue, prompt assembly, and the generation collaborator seam.

pub mod assistant;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod generate;
pub mod prompt;
pub mod tags;
pub mod types;

/// Conversation assistant.
pub use assistant::Assistant;
/// Clarification-question catalogue.
pub use catalogue::{REUSE_QUESTION, questions_for};
/// Configuration model and loader.
pub use config::{API_KEY_ENV, ConfigError, GeneratorConfig, MemoryConfig, SanadConfig};
/// Assistant error type.
pub use error::AssistantError;
/// Generation collaborator interface and HTTP implementation.
pub use generate::{DocumentGenerator, GenerateError, HttpGenerator};
/// Prompt assembly helpers.
pub use prompt::{ANSWER_SEPARATOR, DEFAULT_PERSONA, compose_prompt};
/// Record tag extraction.
pub use tags::extract_tags;
/// Core data types.
pub use types::{DocType, Message, Role, Stage};
