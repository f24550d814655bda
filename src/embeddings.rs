//! OpenAI embeddings client

use crate::config::Config;
use crate::error::{Result, UstaadError};

const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

pub struct EmbeddingsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EmbeddingsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
        }
    }

    /// Embed a single text into a similarity-search vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": EMBEDDING_MODEL,
            "input": text,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| UstaadError::Provider(format!("Embeddings API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UstaadError::Provider(format!("Failed to parse embeddings response: {}", e)))?;

        if let Some(error) = response_json.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown provider error");
            return Err(UstaadError::Provider(format!("Embeddings API error: {}", message)));
        }

        let embedding = response_json["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| UstaadError::Provider("No embedding in response".to_string()))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        Ok(embedding)
    }
}
