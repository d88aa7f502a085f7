//! Research orchestrator
//!
//! PROMPT → AGENT → FINAL ASSISTANT MESSAGE → NORMALIZE
//!
//! Every failure comes back as a [`ResearchFailure`]; nothing here panics or
//! lets an agent error escape as a crash.

use crate::agent::Agent;
use crate::models::{ChatMessage, StructuredResult};
use crate::normalizer::{self, NotParseable};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const NOT_PARSEABLE_MESSAGE: &str =
    "I could not structure the research response. Please try again.";
pub const NO_RESPONSE_MESSAGE: &str = "The research agent returned no valid response.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResearchFailure {
    /// The agent answered but the text could not be structured.
    #[error("research response could not be structured")]
    NotParseable { raw: String },

    /// The transcript held no assistant-authored message.
    #[error("agent returned no assistant message")]
    NoAssistantMessage,

    /// The agent invocation itself failed (transport, auth, rate limit, tool).
    #[error("{0}")]
    Agent(String),
}

impl ResearchFailure {
    /// Message shown in the chat history for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ResearchFailure::NotParseable { .. } => NOT_PARSEABLE_MESSAGE.to_string(),
            ResearchFailure::NoAssistantMessage => NO_RESPONSE_MESSAGE.to_string(),
            ResearchFailure::Agent(description) => format!("Error: {}", description),
        }
    }

    /// Raw agent text when there is one, otherwise the user message.
    pub fn fallback_text(&self) -> String {
        match self {
            ResearchFailure::NotParseable { raw } => raw.clone(),
            other => other.user_message(),
        }
    }
}

/// Build the system instruction sent ahead of every research query.
pub fn build_system_prompt() -> String {
    format!(
        "You are Q.AI, an elite research intelligence.\n\
         If the query requires research:\n\
         - Use tools if needed.\n\
         - Return ONLY valid JSON matching this schema.\n\
         {}\n\
         Do not include any extra text.",
        StructuredResult::format_instructions()
    )
}

pub struct ResearchOrchestrator {
    agent: Arc<dyn Agent>,
    system_prompt: String,
}

impl ResearchOrchestrator {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            system_prompt: build_system_prompt(),
        }
    }

    pub async fn research(&self, query: &str) -> Result<StructuredResult, ResearchFailure> {
        info!(query_len = query.len(), "Research: invoking agent");

        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::human(query),
        ];

        let reply = self.agent.invoke(messages).await.map_err(|e| {
            warn!("Research agent failed: {}", e);
            ResearchFailure::Agent(e.to_string())
        })?;

        let raw = reply.final_answer().ok_or_else(|| {
            warn!(
                messages = reply.messages.len(),
                "Research agent transcript has no assistant message"
            );
            ResearchFailure::NoAssistantMessage
        })?;

        normalizer::normalize(raw).map_err(|NotParseable| {
            warn!(raw_len = raw.len(), "Research response not parseable");
            ResearchFailure::NotParseable {
                raw: raw.to_string(),
            }
        })
    }
}
