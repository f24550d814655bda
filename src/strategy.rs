//! Response strategies
//!
//! Maps the caller-supplied version tag to one of two answering strategies.
//! The set of versions is a closed enum, so adding or removing one is a
//! compile-checked change and an unknown tag is a typed error.

use crate::agent::executor::AgentExecutor;
use crate::agent::tools::Tool;
use crate::chain::ConversationalRetrievalChain;
use crate::error::{Result, UstaadError};
use crate::history::Turn;
use crate::llm::{ChatModel, Correlation};
use crate::retriever::Retriever;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyVersion {
    /// Conversational retrieval chain: condense, retrieve, answer.
    V1,
    /// Tool-using conversational agent.
    V2,
}

impl StrategyVersion {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "v1" => Ok(StrategyVersion::V1),
            "v2" => Ok(StrategyVersion::V2),
            other => Err(UstaadError::UnknownStrategy(other.to_string())),
        }
    }
}

#[async_trait]
pub trait Strategy: Send + Sync {
    async fn respond(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String>;
}

pub struct ChainStrategy {
    chain: ConversationalRetrievalChain,
}

#[async_trait]
impl Strategy for ChainStrategy {
    async fn respond(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String> {
        self.chain.run(question, transcript, correlation).await
    }
}

pub struct AgentStrategy {
    executor: AgentExecutor,
}

#[async_trait]
impl Strategy for AgentStrategy {
    async fn respond(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String> {
        self.executor.run(question, transcript, correlation).await
    }
}

/// Strategies are built once per process against the shared provider
/// handles and are stateless across requests; history is passed in
/// explicitly per call.
pub struct StrategyRegistry {
    v1: ChainStrategy,
    v2: AgentStrategy,
}

impl StrategyRegistry {
    pub fn new(
        model: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        Self {
            v1: ChainStrategy {
                chain: ConversationalRetrievalChain::new(Arc::clone(&model), Arc::clone(&retriever)),
            },
            v2: AgentStrategy { executor: AgentExecutor::new(model, tools) },
        }
    }

    pub fn resolve(&self, version: StrategyVersion) -> &dyn Strategy {
        match version {
            StrategyVersion::V1 => &self.v1,
            StrategyVersion::V2 => &self.v2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        assert_eq!(StrategyVersion::parse("v1").unwrap(), StrategyVersion::V1);
        assert_eq!(StrategyVersion::parse("v2").unwrap(), StrategyVersion::V2);
    }

    #[test]
    fn test_parse_unknown_version() {
        let err = StrategyVersion::parse("v3").unwrap_err();
        match err {
            UstaadError::UnknownStrategy(tag) => assert_eq!(tag, "v3"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
