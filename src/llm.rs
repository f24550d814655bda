//! LLM chat-completions client
//!
//! Thin client for an OpenAI-compatible chat completions API. When the base
//! URL points at an observability proxy, per-request correlation identifiers
//! are attached as property headers; they carry no semantic weight.

use crate::config::Config;
use crate::error::{Result, UstaadError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".to_string(), content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }

    pub fn assistant(content: &str) -> Self {
        Self { role: "assistant".to_string(), content: content.to_string() }
    }
}

/// Opaque correlation tokens passed through to the provider for tracing.
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    pub request_id: String,
    pub user_id: String,
    pub user_type: String,
}

/// Seam for the chat model, so strategies can be tested against mocks.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        correlation: &Correlation,
    ) -> Result<String>;
}

pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    helicone_api_key: Option<String>,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.chat_model.clone(),
            helicone_api_key: config.helicone_api_key.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        correlation: &Correlation,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.helicone_api_key {
            request = request.header("Helicone-Auth", format!("Bearer {}", key));
        }
        if !correlation.request_id.is_empty() {
            request = request.header("Helicone-Property-RequestId", &correlation.request_id);
        }
        if !correlation.user_id.is_empty() {
            request = request.header("Helicone-User-Id", &correlation.user_id);
        }
        if !correlation.user_type.is_empty() {
            request = request.header("Helicone-Property-UserType", &correlation.user_type);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| UstaadError::Provider(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UstaadError::Provider(format!("Failed to parse LLM response: {}", e)))?;

        if let Some(error) = response_json.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown provider error");
            return Err(UstaadError::Provider(format!("LLM API error: {}", message)));
        }

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| UstaadError::Provider("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}
