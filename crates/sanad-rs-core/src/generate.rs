//! Document generation collaborator: trait, error taxonomy, and the
//! HTTP client implementation.

use crate::config::GeneratorConfig;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

/// Errors surfaced by the generation collaborator.
///
/// Every variant is recoverable: the assistant reports the message to the
/// user and returns to the initial stage.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// No API credential configured.
    #[error("لم يتم ضبط مفتاح الخدمة")]
    MissingCredential,
    /// Upstream returned a non-success status.
    #[error("فشل الطلب ({status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Upstream error message, verbatim.
        message: String,
    },
    /// Transport-level failure.
    #[error("خطأ في الاتصال: {0}")]
    Network(String),
    /// Response body missing the candidate text or otherwise unreadable.
    #[error("استجابة غير صالحة: {0}")]
    Malformed(String),
}

/// External text-generation service drafting documents from a prompt.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Draft a document of the given type from the composed prompt.
    async fn generate(&self, doc_type: &str, prompt: &str) -> Result<String, GenerateError>;
}

/// Request body for the `generateContent` endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

/// One content block of the request.
#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

/// Text part shared by request and response bodies.
#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

/// Response body for the `generateContent` endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// One generation candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

/// Content of a candidate.
#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

/// Structured upstream error.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// HTTP implementation over a Gemini-style `generateContent` endpoint.
///
/// No retries and no caller timeout; any non-success status or missing
/// candidate field is surfaced verbatim as a failure.
pub struct HttpGenerator {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// API credential, absent when unconfigured.
    api_key: Option<String>,
    /// Model identifier in the request path.
    model: String,
    /// Endpoint base URL.
    base_url: String,
}

impl HttpGenerator {
    /// Build a generator from the config section.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resolve_api_key(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DocumentGenerator for HttpGenerator {
    async fn generate(&self, doc_type: &str, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_ref().ok_or(GenerateError::MissingCredential)?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
        };
        debug!(
            "requesting generation (doc_type={doc_type}, prompt_len={})",
            prompt.len()
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerateError::Network(err.to_string()))?;
        let status = response.status();
        let payload: GenerateResponse = response.json().await.map_err(|err| {
            if status.is_success() {
                GenerateError::Malformed(err.to_string())
            } else {
                GenerateError::Http {
                    status: status.as_u16(),
                    message: status.to_string(),
                }
            }
        })?;

        if !status.is_success() {
            let message = payload
                .error
                .map(|error| error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(GenerateError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| GenerateError::Malformed("missing candidate text".to_string()))?;
        if text.trim().is_empty() {
            return Err(GenerateError::Malformed("empty candidate text".to_string()));
        }
        Ok(text)
    }
}

/// Scripted generator double for controller tests.
#[cfg(test)]
pub(crate) struct ScriptedGenerator {
    /// Queued replies, consumed front to back.
    replies: parking_lot::Mutex<std::collections::VecDeque<Result<String, GenerateError>>>,
    /// Prompts observed by the double.
    pub prompts: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            replies: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            prompts: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn ok(text: &str) -> Self {
        let double = Self::new();
        double.push(Ok(text.to_string()));
        double
    }

    pub fn err(error: GenerateError) -> Self {
        let double = Self::new();
        double.push(Err(error));
        double
    }

    pub fn push(&self, reply: Result<String, GenerateError>) {
        self.replies.lock().push_back(reply);
    }
}

#[cfg(test)]
#[async_trait]
impl DocumentGenerator for ScriptedGenerator {
    async fn generate(&self, _doc_type: &str, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerateError::Network("no scripted reply".to_string())))
    }
}
