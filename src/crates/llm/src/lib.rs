//! Language-model backend client for droidpilot.
//!
//! This crate provides the chat abstraction the command interpreter talks
//! through, plus a concrete client for Ollama-compatible local backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{BackendConfig, ChatMessage, ChatModel, ChatRequest, OllamaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BackendConfig::new("http://localhost:11434", "gemma3:latest");
//!     let client = OllamaClient::new(config)?;
//!
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You are an Android device controller."),
//!         ChatMessage::user("Convert this command: \"take a screenshot\""),
//!     ])
//!     .with_temperature(0.1);
//!
//!     let response = client.chat(request).await?;
//!     println!("Response: {}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod ollama;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatModel, ChatRequest, ChatResponse, ChatRole, SamplingOptions};
pub use config::BackendConfig;
pub use error::{LlmError, Result};
pub use ollama::OllamaClient;
