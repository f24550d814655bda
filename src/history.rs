//! Chat transcript handling
//!
//! Converts the caller's raw transcript into provider chat messages, folds
//! trailing user turns into the pending question, and bounds the history
//! window supplied to the agent.

use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior conversation turn, as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Trim the question and collapse newlines into spaces.
pub fn sanitize_question(question: &str) -> String {
    question.trim().replace('\n', " ")
}

/// Fold trailing user turns into the pending question.
///
/// Scans the transcript from the most recent turn backward. Each trailing
/// user turn's text is appended to the question (", "-separated, nearest
/// turn first) until the first assistant turn is reached. The returned
/// transcript is the prefix ending on that assistant turn, so it always
/// ends on an assistant turn or is empty.
///
/// A user may send several follow-up fragments before the system replies
/// once; folding them into a single question improves retrieval and
/// condensation quality.
pub fn normalize(question: &str, transcript: &[Turn]) -> (String, Vec<Turn>) {
    let mut effective_question = question.to_string();
    let mut boundary = transcript.len();

    for (idx, turn) in transcript.iter().enumerate().rev() {
        if turn.role == Role::Assistant {
            break;
        }
        effective_question.push_str(", ");
        effective_question.push_str(&turn.text);
        boundary = idx;
    }

    (effective_question, transcript[..boundary].to_vec())
}

/// Last `k` turns of the transcript (bounded memory window, not summarized).
pub fn window(transcript: &[Turn], k: usize) -> &[Turn] {
    let start = transcript.len().saturating_sub(k);
    &transcript[start..]
}

/// Convert turns to provider chat messages.
pub fn to_chat_messages(transcript: &[Turn]) -> Vec<ChatMessage> {
    transcript
        .iter()
        .map(|turn| match turn.role {
            Role::User => ChatMessage::user(&turn.text),
            Role::Assistant => ChatMessage::assistant(&turn.text),
        })
        .collect()
}

/// Render turns as a plain-text dialogue for the condense prompt.
pub fn format_dialogue(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|turn| match turn.role {
            Role::User => format!("Human: {}", turn.text),
            Role::Assistant => format!("Assistant: {}", turn.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
