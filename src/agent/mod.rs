//! Tool-using conversational agent
//!
//! A bounded think/act loop: the LLM either answers directly or names a tool
//! to invoke; tool observations are fed back until a final answer is emitted.

pub mod calculator;
pub mod executor;
pub mod output_parser;
pub mod prompts;
pub mod tools;
