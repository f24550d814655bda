//! Process configuration
//!
//! All settings are read once from the environment at startup and are
//! immutable afterwards. Binaries load `.env` via dotenv before calling
//! `Config::from_env`.

use crate::error::{Result, UstaadError};

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key (chat completions and embeddings)
    pub openai_api_key: String,

    /// OpenAI-compatible base URL (may point at an observability proxy)
    pub openai_base_url: String,

    /// Chat model used by both strategies
    pub chat_model: String,

    /// Optional auth key for the observability proxy in front of the LLM
    pub helicone_api_key: Option<String>,

    /// SerpAPI key for the agent's web-search tool
    pub serpapi_api_key: String,

    /// Pinecone API key
    pub pinecone_api_key: String,

    /// Full https host of the Pinecone index
    pub pinecone_index_host: String,

    /// Pinecone namespace holding the knowledge base
    pub pinecone_namespace: String,

    /// Port for the HTTP server
    pub port: u16,

    /// Per-request deadline in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            chat_model: optional("OPENAI_MODEL", "gpt-3.5-turbo"),
            helicone_api_key: std::env::var("HELICONE_API_KEY").ok(),
            serpapi_api_key: required("SERPAPI_API_KEY")?,
            pinecone_api_key: required("PINECONE_API_KEY")?,
            pinecone_index_host: required("PINECONE_INDEX_HOST")?,
            pinecone_namespace: optional("PINECONE_NAMESPACE", ""),
            port: optional("PORT", "1001")
                .parse()
                .map_err(|_| UstaadError::Config("PORT must be a number".to_string()))?,
            request_timeout_secs: optional("REQUEST_TIMEOUT_SECS", "120")
                .parse()
                .map_err(|_| UstaadError::Config("REQUEST_TIMEOUT_SECS must be a number".to_string()))?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| UstaadError::Config(format!("Missing required environment variable: {}", name)))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
