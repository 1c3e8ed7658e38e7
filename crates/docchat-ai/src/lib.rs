//! AI engine for docchat.
//!
//! Provides the Gemini API client with:
//! - Streaming (SSE) support with cumulative fragment assembly
//! - Inline PDF attachment encoding (base64)
//! - Lazy session management (documents attached on first message only)
//! - One-shot document summarization

pub mod document;
pub mod gemini;
pub mod session;
pub mod streaming;
pub mod summary;

use async_trait::async_trait;

pub use document::{
    encode_batch, strip_data_url, DocumentError, DocumentPayload, DocumentSource, ACCEPTED_MIME,
    MAX_FILE_BYTES,
};
pub use gemini::{GeminiClient, GeminiConfig};
pub use session::{ChatSession, SessionManager, SYSTEM_INSTRUCTION};
pub use streaming::Assembler;
pub use summary::{summarize, SUMMARY_INSTRUCTION};

/// A generative-content backend: one streaming multi-turn call shape and
/// one stateless single-shot call shape. Implemented by [`GeminiClient`];
/// mocked in tests.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Single-shot request returning the complete text.
    async fn generate(&self, messages: &[Message]) -> Result<String, ApiError>;

    /// Streaming request. `on_delta` is invoked with each text fragment in
    /// arrival order; the returned value is the full assembled text.
    async fn generate_streaming(
        &self,
        messages: &[Message],
        on_delta: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<String, ApiError>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Inline attachments. Populated only on the first user message of a
    /// session; empty everywhere else.
    #[serde(default)]
    pub attachments: Vec<DocumentPayload>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<DocumentPayload>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Transport-level failures, shared by both call shapes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API error: {0}")]
    Api(String),
    #[error("rate limited")]
    RateLimited,
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("a request is already in flight")]
    Busy,
}

/// Operation-boundary failures. The same transport error maps to a
/// different variant depending on which operation it interrupted, so the
/// app can surface each one differently.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session could not be created: {0}")]
    SessionInit(ApiError),
    #[error("dispatch failed: {0}")]
    Dispatch(ApiError),
    #[error("summary failed: {0}")]
    Summary(ApiError),
}
