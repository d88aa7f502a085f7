//! Request pipeline
//!
//! QUERY → CLASSIFY → {RESEARCH → NORMALIZE | CONVERSE} → HISTORY
//!
//! One query is processed to completion per session before the next is
//! accepted. Every outcome, failures included, ends as exactly one history
//! entry.

use crate::agent::{Agent, ToolCallingAgent};
use crate::classifier::{QueryClassifier, QueryKind};
use crate::config::AssistantConfig;
use crate::conversation::ConversationHandler;
use crate::llm::{Generator, GroqClient};
use crate::models::HistoryEntry;
use crate::research::ResearchOrchestrator;
use crate::state::{SessionState, SubmitRejection};
use crate::tools::create_default_registry;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Assistant {
    research: ResearchOrchestrator,
    conversation: ConversationHandler,
}

impl Assistant {
    pub fn new(agent: Arc<dyn Agent>, generator: Arc<dyn Generator>) -> Self {
        Self {
            research: ResearchOrchestrator::new(agent),
            conversation: ConversationHandler::new(generator),
        }
    }

    /// Wire the Groq client, default tools and agent from configuration.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let client = Arc::new(GroqClient::from_config(config)?);
        let registry = create_default_registry(config)?;
        let agent = ToolCallingAgent::new(client.clone(), registry, config.agent_max_iterations);

        info!(
            model = client.model(),
            tools = ?agent.tool_names(),
            "Assistant initialized"
        );

        Ok(Self::new(Arc::new(agent), client))
    }

    pub fn research(&self) -> &ResearchOrchestrator {
        &self.research
    }

    /// Submit and process in one step.
    pub async fn handle(
        &self,
        mut state: SessionState,
        query: &str,
    ) -> std::result::Result<SessionState, (SessionState, SubmitRejection)> {
        if let Err(rejection) = state.submit(query) {
            return Err((state, rejection));
        }
        Ok(self.process(state).await)
    }

    /// Run the pending query, if any, and append its outcome to history.
    pub async fn process(&self, mut state: SessionState) -> SessionState {
        let Some(query) = state.take_pending() else {
            state.reset_idle();
            return state;
        };

        let entry = self.answer(&query).await;
        state.complete(entry);
        state
    }

    async fn answer(&self, query: &str) -> HistoryEntry {
        let kind = QueryClassifier::classify(query);
        info!(?kind, "Query classified");

        match kind {
            QueryKind::Research => match self.research.research(query).await {
                Ok(result) => HistoryEntry::structured(query, result),
                Err(failure) => {
                    warn!("Research failed: {}", failure);
                    HistoryEntry::response(query, failure.user_message())
                }
            },
            QueryKind::Conversational => match self.conversation.converse(query).await {
                Ok(text) => HistoryEntry::response(query, text),
                Err(e) => {
                    warn!("Conversational call failed: {}", e);
                    HistoryEntry::response(query, format!("Error: {}", e))
                }
            },
        }
    }
}
