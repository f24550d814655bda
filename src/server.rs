//! Request handling
//!
//! Routing and the chat request handler live here so tests can exercise
//! them directly; socket plumbing is in the server binary. Shared state is
//! built once at startup and is read-only afterwards.

use crate::agent::tools::{Calculator, KnowledgeBaseTool, Tool, WebSearch};
use crate::chain::RetrievalQaChain;
use crate::config::Config;
use crate::embeddings::EmbeddingsClient;
use crate::error::{Result, UstaadError};
use crate::history::{self, Turn};
use crate::llm::{ChatModel, Correlation, LlmClient};
use crate::retriever::{Retriever, VectorRetriever};
use crate::strategy::{Strategy, StrategyRegistry, StrategyVersion};
use crate::vector_store::PineconeStore;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Shared, read-only per-process state.
pub struct AppState {
    pub registry: StrategyRegistry,
    pub request_timeout: Duration,
}

/// Inbound chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default, rename = "requestId")]
    pub request_id: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "userType")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

pub struct RouteResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl RouteResponse {
    fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, content_type: "application/json", body: body.to_string() }
    }

    fn text(status: u16, body: &str) -> Self {
        Self { status, content_type: "text/plain", body: body.to_string() }
    }
}

/// Build process-wide state. Fails (and the caller exits) when the vector
/// store is unreachable, so the server never binds without its knowledge
/// base.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store = PineconeStore::new(config);
    store.check_connection().await?;
    info!("Vector store connection established");

    let embeddings = EmbeddingsClient::new(config);
    let retriever: Arc<dyn Retriever> = Arc::new(VectorRetriever::new(embeddings, store));
    let model: Arc<dyn ChatModel> = Arc::new(LlmClient::new(config));

    let qa_chain = RetrievalQaChain::new(Arc::clone(&model), Arc::clone(&retriever), 0.0);
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(WebSearch::new(config)),
        Arc::new(Calculator),
        Arc::new(KnowledgeBaseTool::new(qa_chain)),
    ];

    Ok(AppState {
        registry: StrategyRegistry::new(model, retriever, tools),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    })
}

/// Route one parsed HTTP request.
pub async fn handle_request(
    state: &AppState,
    method: &str,
    path: &str,
    body: &str,
) -> RouteResponse {
    match (method, path) {
        ("GET", "/") => RouteResponse::text(200, "Hello World!"),
        ("POST", "/chat/ustaad") => match handle_chat(state, body).await {
            Ok(answer) => RouteResponse::json(200, serde_json::json!({ "text": answer })),
            Err(e) => error_response(e),
        },
        (_, "/chat/ustaad") => {
            RouteResponse::json(405, serde_json::json!({ "error": "Method not allowed" }))
        }
        _ => RouteResponse::json(
            404,
            serde_json::json!({ "error": format!("Endpoint not found: {} {}", method, path) }),
        ),
    }
}

async fn handle_chat(state: &AppState, body: &str) -> Result<String> {
    let request: ChatRequest = serde_json::from_str(body)
        .map_err(|e| UstaadError::Validation(format!("Invalid JSON body: {}", e)))?;

    let question = request
        .question
        .as_deref()
        .map(history::sanitize_question)
        .unwrap_or_default();
    if question.is_empty() {
        return Err(UstaadError::Validation("No question in the request".to_string()));
    }

    let version = StrategyVersion::parse(request.version.as_deref().unwrap_or(""))?;
    let (question, transcript) = history::normalize(&question, &request.history);

    let correlation = Correlation {
        request_id: request.request_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        user_id: request.user_id.unwrap_or_default(),
        user_type: request.user_type.unwrap_or_default(),
    };

    info!(
        request_id = %correlation.request_id,
        environment = %request.environment.as_deref().unwrap_or("unknown"),
        "Handling chat request ({:?})",
        version
    );

    let strategy = state.registry.resolve(version);
    match tokio::time::timeout(
        state.request_timeout,
        strategy.respond(&question, &transcript, &correlation),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(UstaadError::Provider("Request deadline exceeded".to_string())),
    }
}

fn error_response(e: UstaadError) -> RouteResponse {
    error!("Request failed: {}", e);

    let body = match &e {
        // Validation messages are surfaced verbatim to the caller.
        UstaadError::Validation(message) => serde_json::json!({ "message": message }),
        _ => serde_json::json!({ "error": e.to_string(), "code": e.code() }),
    };

    RouteResponse::json(e.status(), body)
}
