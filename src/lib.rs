pub mod agent;
pub mod chain;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod history;
pub mod llm;
pub mod retriever;
pub mod server;
pub mod strategy;
pub mod vector_store;
