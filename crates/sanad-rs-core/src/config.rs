//! Configuration model for the assistant core.

use sanad_rs_memory::{
    FileKvSlot, InMemoryKvSlot, KeyValueSlot, KvConversationMemory, MemoryError,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "SANAD_API_KEY";

/// Errors returned by config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Config parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Root config for the Sanad core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SanadConfig {
    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Generation collaborator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl SanadConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> SanadConfigBuilder {
        SanadConfigBuilder::new()
    }

    /// Load config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Builder for assembling a `SanadConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct SanadConfigBuilder {
    config: SanadConfig,
}

impl SanadConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: SanadConfig::default(),
        }
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the generator configuration.
    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.config.generator = generator;
        self
    }

    /// Finalize and return the built `SanadConfig`.
    pub fn build(self) -> SanadConfig {
        self.config
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum records kept in the conversation log.
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
    /// Root directory for the file-backed slot; in-memory when absent.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_conversations: default_max_conversations(),
            root: None,
        }
    }
}

/// Generation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API credential; falls back to [`API_KEY_ENV`] when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl GeneratorConfig {
    /// Configured API key, or the environment fallback.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
    }
}

impl MemoryConfig {
    /// Build the conversation memory described by this config.
    ///
    /// File-backed under `root` when set, session-scoped in-memory
    /// otherwise.
    pub fn build_memory(&self) -> Result<KvConversationMemory, MemoryError> {
        let slot: Arc<dyn KeyValueSlot> = match &self.root {
            Some(root) => Arc::new(FileKvSlot::new(root)?),
            None => Arc::new(InMemoryKvSlot::new()),
        };
        Ok(KvConversationMemory::with_capacity(
            slot,
            self.max_conversations,
        ))
    }
}

fn default_max_conversations() -> usize {
    sanad_rs_memory::DEFAULT_MAX_CONVERSATIONS
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
