//! Knowledge retriever
//!
//! Embeds the query and searches the vector store. The `Retriever` trait is
//! the seam both strategies depend on, so tests can substitute a mock.

use crate::embeddings::EmbeddingsClient;
use crate::error::Result;
use crate::vector_store::{PineconeStore, RetrievedDocument};
use async_trait::async_trait;

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>>;
}

/// Retriever backed by OpenAI embeddings and a Pinecone index.
pub struct VectorRetriever {
    embeddings: EmbeddingsClient,
    store: PineconeStore,
}

impl VectorRetriever {
    pub fn new(embeddings: EmbeddingsClient, store: PineconeStore) -> Self {
        Self { embeddings, store }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let embedding = self.embeddings.embed(query).await?;
        self.store.query(&embedding, top_k).await
    }
}
