//! Tool-using agent
//!
//! CALL MODEL → RUN REQUESTED TOOLS → FEED RESULTS BACK → REPEAT UNTIL ANSWER
//!
//! The returned transcript is chronological; callers take the last
//! assistant-authored message as the answer.

use crate::error::AssistantError;
use crate::llm::{ChatModel, WireMessage};
use crate::models::{AgentReply, ChatMessage};
use crate::tools::ToolRegistry;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tool-using agent capability.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<AgentReply>;
}

/// Agent driving a chat model with function calling over a tool registry.
pub struct ToolCallingAgent {
    model: Arc<dyn ChatModel>,
    registry: ToolRegistry,
    max_iterations: usize,
}

impl ToolCallingAgent {
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            model,
            registry,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.registry.list()
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<AgentReply> {
        let specs = self.registry.specs();
        let mut wire: Vec<WireMessage> = messages.iter().map(WireMessage::from).collect();
        let mut transcript = messages;

        for round in 1..=self.max_iterations {
            let reply = self.model.complete(&wire, &specs).await?;
            let calls = reply.requested_tools().to_vec();

            transcript.push(ChatMessage::assistant(
                reply.content.clone().unwrap_or_default(),
            ));

            if calls.is_empty() {
                info!(rounds = round, "Agent produced final answer");
                return Ok(AgentReply {
                    messages: transcript,
                });
            }

            debug!(round, calls = calls.len(), "Agent requested tools");
            wire.push(reply);

            for call in calls {
                let output = match self
                    .registry
                    .execute_call(&call.function.name, &call.function.arguments)
                    .await
                {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(tool = %call.function.name, "Tool call failed: {}", e);
                        format!("Error: {}", e)
                    }
                };

                transcript.push(ChatMessage::tool(output.clone()));
                wire.push(WireMessage::tool_result(call.id, output));
            }
        }

        Err(AssistantError::MaxIterationsExceeded(self.max_iterations))
    }
}
