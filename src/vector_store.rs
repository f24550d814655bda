//! Pinecone vector store client
//!
//! Read-only query client against an existing Pinecone index. The index is
//! populated out of band; this process never writes to it.

use crate::config::Config;
use crate::error::{Result, UstaadError};

/// Metadata key under which the document text is stored in the index.
const TEXT_KEY: &str = "text";

/// A document returned by similarity search.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub text: String,
    pub score: f32,
}

pub struct PineconeStore {
    client: reqwest::Client,
    api_key: String,
    index_host: String,
    namespace: String,
}

impl PineconeStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.pinecone_api_key.clone(),
            index_host: config.pinecone_index_host.clone(),
            namespace: config.pinecone_namespace.clone(),
        }
    }

    /// Verify the index is reachable. Called before the server binds its
    /// listening port; a failure here aborts startup.
    pub async fn check_connection(&self) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/describe_index_stats", self.index_host))
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| UstaadError::Provider(format!("Pinecone connection failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(UstaadError::Provider(format!(
                "Pinecone index check failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Query the index for the `top_k` nearest documents.
    pub async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let body = serde_json::json!({
            "vector": embedding,
            "topK": top_k,
            "namespace": self.namespace,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(format!("{}/query", self.index_host))
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| UstaadError::Provider(format!("Pinecone query failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UstaadError::Provider(format!("Failed to parse Pinecone response: {}", e)))?;

        let matches = response_json["matches"]
            .as_array()
            .ok_or_else(|| UstaadError::Provider("No matches in Pinecone response".to_string()))?;

        let documents = matches
            .iter()
            .filter_map(|m| {
                let text = m["metadata"][TEXT_KEY].as_str()?;
                let score = m["score"].as_f64().unwrap_or(0.0) as f32;
                Some(RetrievedDocument { text: text.to_string(), score })
            })
            .collect();

        Ok(documents)
    }
}
