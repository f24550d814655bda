//! Agent tools
//!
//! Each tool is a named capability the agent can invoke by emitting a
//! `{action, action_input}` step. Tool observations are fed back into the
//! loop, except for tools marked `return_direct`, whose observation is the
//! final answer.

use crate::agent::calculator;
use crate::chain::RetrievalQaChain;
use crate::config::Config;
use crate::error::{Result, UstaadError};
use crate::llm::Correlation;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// When true, the tool's observation is returned to the caller
    /// immediately instead of being fed back to the model.
    fn return_direct(&self) -> bool {
        false
    }

    async fn call(&self, input: &str, correlation: &Correlation) -> Result<String>;
}

/// Web search via SerpAPI.
pub struct WebSearch {
    client: reqwest::Client,
    api_key: String,
    language: String,
    country: String,
}

impl WebSearch {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.serpapi_api_key.clone(),
            language: "en".to_string(),
            country: "in".to_string(),
        }
    }

    /// Pick the most direct answer out of a SerpAPI result page.
    fn extract_answer(results: &serde_json::Value) -> String {
        if let Some(answer) = results["answer_box"]["answer"].as_str() {
            return answer.to_string();
        }
        if let Some(snippet) = results["answer_box"]["snippet"].as_str() {
            return snippet.to_string();
        }
        if let Some(description) = results["knowledge_graph"]["description"].as_str() {
            return description.to_string();
        }
        if let Some(snippet) = results["organic_results"][0]["snippet"].as_str() {
            return snippet.to_string();
        }
        "No good search result found".to_string()
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "a search engine. useful for when you need to answer questions about current events. input should be a search query."
    }

    async fn call(&self, input: &str, _correlation: &Correlation) -> Result<String> {
        debug!("Web search: {}", input);

        let response = self
            .client
            .get("https://serpapi.com/search.json")
            .query(&[
                ("q", input),
                ("api_key", self.api_key.as_str()),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
            ])
            .send()
            .await
            .map_err(|e| UstaadError::Provider(format!("Search API call failed: {}", e)))?;

        let results: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UstaadError::Provider(format!("Failed to parse search response: {}", e)))?;

        if let Some(error) = results["error"].as_str() {
            return Err(UstaadError::Provider(format!("Search API error: {}", error)));
        }

        Ok(Self::extract_answer(&results))
    }
}

/// Local arithmetic evaluator.
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Useful for getting the result of a math expression. The input to this tool should be a valid mathematical expression that could be executed by a simple calculator."
    }

    async fn call(&self, input: &str, _correlation: &Correlation) -> Result<String> {
        // A bad expression is the model's mistake, not a failure; answer in
        // text so the model can recover on the next step.
        match calculator::evaluate(input) {
            Ok(value) => Ok(calculator::format_result(value)),
            Err(_) => Ok("I don't know how to do that.".to_string()),
        }
    }
}

/// Knowledge-base lookup backed by the retrieval-QA chain. Marked
/// return-direct: its answer goes straight to the caller.
pub struct KnowledgeBaseTool {
    chain: RetrievalQaChain,
}

impl KnowledgeBaseTool {
    pub fn new(chain: RetrievalQaChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "nbc-qa"
    }

    fn description(&self) -> &str {
        "Use this tool to retrieve any information construction materials, building codes and regulations, construction techniques and best practices, construction equipment, construction management, health and safety guidelines, and environmental considerations. DO NOT use this tool of the question is not related to construction."
    }

    fn return_direct(&self) -> bool {
        true
    }

    async fn call(&self, input: &str, correlation: &Correlation) -> Result<String> {
        self.chain.run(input, correlation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_calculator_tool() {
        let tool = Calculator;
        let correlation = Correlation::default();
        assert_eq!(tool.call("2+2", &correlation).await.unwrap(), "4");
        assert_eq!(
            tool.call("what is two plus two", &correlation).await.unwrap(),
            "I don't know how to do that."
        );
    }

    #[test]
    fn test_search_answer_extraction() {
        let results = serde_json::json!({
            "answer_box": { "answer": "42" }
        });
        assert_eq!(WebSearch::extract_answer(&results), "42");

        let results = serde_json::json!({
            "organic_results": [ { "snippet": "Concrete cures in 28 days." } ]
        });
        assert_eq!(WebSearch::extract_answer(&results), "Concrete cures in 28 days.");

        let results = serde_json::json!({});
        assert_eq!(WebSearch::extract_answer(&results), "No good search result found");
    }
}
