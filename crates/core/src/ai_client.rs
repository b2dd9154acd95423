//! AI Backend Contract
//!
//! A generic capability for turning a prompt (plus optional prior history)
//! into response text. Concrete integrations live in [`crate::providers`] and
//! are selected at construction time by explicit configuration.

use crate::history::Turn;
use async_trait::async_trait;
use thiserror::Error;

/// Failures an AI exchange can produce.
#[derive(Debug, Error)]
pub enum AiError {
    /// The required API key or endpoint configuration is absent. Raised
    /// before any network call is made.
    #[error("required API credential is missing")]
    MissingCredential,

    /// The upstream service returned a non-success status. The message is
    /// extracted from the upstream error payload when present.
    #[error("AI service error: {0}")]
    RemoteService(String),

    /// The upstream call succeeded but the payload contained no usable text.
    #[error("AI response contained no usable text")]
    MalformedResponse,

    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A single text-generation request.
///
/// `history` holds the prior turns only; the current `prompt` is never part
/// of it. Threading the history through explicitly keeps the backend free of
/// shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct AiRequest {
    pub prompt: String,
    pub history: Vec<Turn>,
}

impl AiRequest {
    /// A request with no prior history.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
        }
    }

    /// A request carrying the prior conversation turns.
    pub fn with_history(prompt: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            prompt: prompt.into(),
            history,
        }
    }
}

/// A text-generation backend.
///
/// The conversational variant sends the full history plus a fixed persona on
/// every call; the stateless variant sends only the current prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiBackend: Send + Sync {
    async fn generate(&self, request: &AiRequest) -> Result<String, AiError>;
}
