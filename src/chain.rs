//! Retrieval-QA chains
//!
//! `ConversationalRetrievalChain` is the v1 strategy core: condense the
//! question against history, retrieve context, answer. `RetrievalQaChain`
//! is the single-stage variant wrapped as the agent's knowledge-base tool.

use crate::error::Result;
use crate::history::{self, Turn};
use crate::llm::{ChatMessage, ChatModel, Correlation};
use crate::retriever::Retriever;
use std::sync::Arc;
use tracing::debug;

/// Documents retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

const CONDENSE_PROMPT: &str = "Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

const QA_PROMPT: &str = "You are a helpful AI assistant. Use the following pieces of context to answer the question at the end.

1. Feel free to breakdown a question into multiple sub questions if needed, and answer each of them.
2. If you don't know the answer, just say you don't know. DO NOT try to make up an answer.

{context}

Question: {question}
Helpful answer in markdown:";

/// Single-stage chain: retrieve context for the question, then answer.
pub struct RetrievalQaChain {
    model: Arc<dyn ChatModel>,
    retriever: Arc<dyn Retriever>,
    top_k: usize,
    temperature: f32,
}

impl RetrievalQaChain {
    pub fn new(model: Arc<dyn ChatModel>, retriever: Arc<dyn Retriever>, temperature: f32) -> Self {
        Self { model, retriever, top_k: DEFAULT_TOP_K, temperature }
    }

    pub async fn run(&self, question: &str, correlation: &Correlation) -> Result<String> {
        let documents = self.retriever.retrieve(question, self.top_k).await?;
        debug!("Retrieved {} documents for question", documents.len());

        let context = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = QA_PROMPT
            .replace("{context}", &context)
            .replace("{question}", question);

        self.model
            .chat(&[ChatMessage::user(&prompt)], self.temperature, correlation)
            .await
    }
}

/// Two-stage chain: condense the follow-up question into a standalone one
/// using the conversation history, then retrieve and answer.
pub struct ConversationalRetrievalChain {
    model: Arc<dyn ChatModel>,
    qa: RetrievalQaChain,
    temperature: f32,
}

impl ConversationalRetrievalChain {
    pub fn new(model: Arc<dyn ChatModel>, retriever: Arc<dyn Retriever>) -> Self {
        // Slightly creative answers, matching the v1 chain's tuning.
        let temperature = 0.3;
        Self {
            qa: RetrievalQaChain::new(Arc::clone(&model), retriever, temperature),
            model,
            temperature,
        }
    }

    pub async fn run(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String> {
        let standalone = if transcript.is_empty() {
            question.to_string()
        } else {
            self.condense(question, transcript, correlation).await?
        };

        debug!("Standalone question: {}", standalone);
        self.qa.run(&standalone, correlation).await
    }

    async fn condense(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String> {
        let prompt = CONDENSE_PROMPT
            .replace("{chat_history}", &history::format_dialogue(transcript))
            .replace("{question}", question);

        let standalone = self
            .model
            .chat(&[ChatMessage::user(&prompt)], self.temperature, correlation)
            .await?;

        Ok(standalone.trim().to_string())
    }
}
