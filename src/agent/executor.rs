//! Agent executor
//!
//! Bounded think/act loop. Each iteration sends the persona, a windowed
//! chat history, the running scratchpad and the user's input to the model,
//! then parses the completion into either a final answer or a tool call.
//! Unknown tool names are fed back as observations so the model can
//! self-correct; a malformed completion gets one corrective reprompt.

use crate::agent::output_parser::{self, AgentStep};
use crate::agent::prompts;
use crate::agent::tools::Tool;
use crate::error::{Result, UstaadError};
use crate::history::{self, Turn};
use crate::llm::{ChatMessage, ChatModel, Correlation};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Provider-conventional cap on agent iterations.
const MAX_ITERATIONS: usize = 15;

/// Turns of history supplied to each model call.
const MEMORY_WINDOW: usize = 5;

/// Returned when the loop exhausts its iteration budget.
const MAX_ITERATIONS_ANSWER: &str = "Agent stopped due to max iterations.";

pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
    memory_window: usize,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { model, tools, max_iterations: MAX_ITERATIONS, memory_window: MEMORY_WINDOW }
    }

    pub async fn run(
        &self,
        question: &str,
        transcript: &[Turn],
        correlation: &Correlation,
    ) -> Result<String> {
        let mut messages = vec![ChatMessage::system(prompts::SYSTEM_PREFIX)];
        messages.extend(history::to_chat_messages(history::window(
            transcript,
            self.memory_window,
        )));
        messages.push(ChatMessage::user(&prompts::render_user_input(question, &self.tools)));

        for iteration in 0..self.max_iterations {
            let completion = self.model.chat(&messages, 0.0, correlation).await?;
            let step = self.parse_with_reprompt(&completion, &messages, correlation).await?;

            match step {
                AgentStep::FinalAnswer(answer) => {
                    info!("Agent finished after {} iteration(s)", iteration + 1);
                    return Ok(answer);
                }
                AgentStep::ToolInvocation { tool, input } => {
                    debug!("Agent step {}: tool={} input={}", iteration + 1, tool, input);

                    let observation = match self.find_tool(&tool) {
                        Some(t) => {
                            let observation = t.call(&input, correlation).await?;
                            if t.return_direct() {
                                info!("Tool {} returned directly", tool);
                                return Ok(observation);
                            }
                            observation
                        }
                        // Recoverable: surface as the observation so the
                        // model can pick a valid tool next step.
                        None => UstaadError::UnknownTool(tool.clone()).to_string(),
                    };

                    messages.push(ChatMessage::assistant(&completion));
                    messages.push(ChatMessage::user(&prompts::render_tool_response(&observation)));
                }
            }
        }

        warn!("Agent exhausted {} iterations without a final answer", self.max_iterations);
        Ok(MAX_ITERATIONS_ANSWER.to_string())
    }

    /// Parse a completion; on a parse failure, reprompt once with a
    /// corrective instruction before giving up.
    async fn parse_with_reprompt(
        &self,
        completion: &str,
        messages: &[ChatMessage],
        correlation: &Correlation,
    ) -> Result<AgentStep> {
        match output_parser::parse(completion) {
            Ok(step) => Ok(step),
            Err(UstaadError::OutputParse(message)) => {
                warn!("Agent output unparseable, reprompting once: {}", message);

                let mut retry_messages = messages.to_vec();
                retry_messages.push(ChatMessage::assistant(completion));
                retry_messages.push(ChatMessage::user(prompts::REFORMAT_REQUEST));

                let retry = self.model.chat(&retry_messages, 0.0, correlation).await?;
                output_parser::parse(&retry)
            }
            Err(e) => Err(e),
        }
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }
}
