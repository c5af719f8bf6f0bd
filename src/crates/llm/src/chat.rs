//! Chat abstraction over language-model backends.
//!
//! `ChatModel` is the seam consumed by the interpreter crate; tests
//! substitute a mock implementation, production code uses `OllamaClient`.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub options: SamplingOptions,
}

impl ChatRequest {
    /// Create a new request from a list of messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            options: SamplingOptions::default(),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Set the nucleus-sampling cutoff.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.options.top_p = Some(top_p);
        self
    }

    /// Cap the number of generated tokens.
    pub fn with_num_predict(mut self, num_predict: u32) -> Self {
        self.options.num_predict = Some(num_predict);
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Free-form assistant text. Callers must not assume it is pure JSON.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
}

/// Chat-capable language-model backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a chat request and await the full response.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Whether the backend is currently reachable and serving.
    async fn is_available(&self) -> bool;

    /// Confirm the backend is ready to serve requests. The default checks
    /// reachability only; clients that can enumerate models also verify
    /// the configured model is installed.
    async fn verify(&self) -> Result<()> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(crate::error::LlmError::ServiceUnavailable(
                "backend not reachable".to_string(),
            ))
        }
    }
}
