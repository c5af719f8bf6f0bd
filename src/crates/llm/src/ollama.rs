//! Ollama client implementation.
//!
//! Talks to an Ollama server over its HTTP API. Any model Ollama can run
//! (Gemma, Llama, Mistral, ...) works; the model name comes from
//! `BackendConfig`.

use crate::chat::{ChatMessage, ChatModel, ChatRequest, ChatResponse, ChatRole};
use crate::config::BackendConfig;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Client for an Ollama-compatible backend.
#[derive(Clone)]
pub struct OllamaClient {
    config: BackendConfig,
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self { config, client })
    }

    /// The model this client is configured to query.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Check if the Ollama server is running.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List the model names installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.config.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LlmError::ServiceUnavailable(format!(
                "model listing failed with status {}",
                response.status()
            )));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Verify the configured model is installed on the server.
    pub async fn check_model(&self) -> Result<()> {
        let models = self.list_models().await?;
        if models.iter().any(|m| m == &self.config.model) {
            Ok(())
        } else {
            Err(LlmError::ModelNotFound(format!(
                "{} (installed: {})",
                self.config.model,
                models.join(", ")
            )))
        }
    }

    fn convert_message(msg: &ChatMessage) -> OllamaMessage {
        OllamaMessage {
            role: match msg.role {
                ChatRole::System => "system".to_string(),
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "assistant".to_string(),
            },
            content: msg.content.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.config.base_url);

        let messages: Vec<OllamaMessage> =
            request.messages.iter().map(Self::convert_message).collect();

        let mut options = HashMap::new();
        if let Some(temp) = request.options.temperature {
            options.insert("temperature", serde_json::Value::from(temp));
        }
        if let Some(top_p) = request.options.top_p {
            options.insert("top_p", serde_json::Value::from(top_p));
        }
        if let Some(num_predict) = request.options.num_predict {
            options.insert("num_predict", serde_json::Value::from(num_predict));
        }

        let req_body = OllamaRequest {
            model: self.config.model.clone(),
            messages,
            stream: false,
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
        };

        debug!(model = %self.config.model, "sending chat request to Ollama");

        let response = self.client.post(&url).json(&req_body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ProviderError(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        let ollama_resp: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(ChatResponse {
            content: ollama_resp.message.content,
            model: ollama_resp.model,
        })
    }

    async fn is_available(&self) -> bool {
        self.check_health().await
    }

    async fn verify(&self) -> Result<()> {
        if !self.check_health().await {
            return Err(LlmError::ServiceUnavailable(format!(
                "no Ollama server at {}",
                self.config.base_url
            )));
        }
        self.check_model().await
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<&'static str, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}
