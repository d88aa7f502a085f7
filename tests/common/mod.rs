#![allow(dead_code)]

use async_trait::async_trait;
use research_assistant::agent::Agent;
use research_assistant::error::AssistantError;
use research_assistant::llm::Generator;
use research_assistant::{AgentReply, Assistant, ChatMessage, StructuredResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Agent stub that answers every invocation with a fixed final message.
pub struct FixedAgent {
    answer: Option<String>,
    fail_with: Option<String>,
    gate: Option<Notify>,
    started: Notify,
    pub calls: AtomicUsize,
}

impl FixedAgent {
    pub fn answering(answer: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.into()),
            fail_with: None,
            gate: None,
            started: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn silent() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            fail_with: None,
            gate: None,
            started: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            fail_with: Some(message.into()),
            gate: None,
            started: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    /// Holds every invocation until [`FixedAgent::release`] is called.
    pub fn gated(answer: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.into()),
            fail_with: None,
            gate: Some(Notify::new()),
            started: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    /// Resolves once an invocation has begun.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for FixedAgent {
    async fn invoke(&self, mut messages: Vec<ChatMessage>) -> research_assistant::Result<AgentReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(message) = &self.fail_with {
            return Err(AssistantError::AgentError(message.clone()));
        }

        messages.push(ChatMessage::tool("search results"));
        if let Some(answer) = &self.answer {
            messages.push(ChatMessage::assistant(answer.clone()));
        }
        Ok(AgentReply { messages })
    }
}

/// Generator stub that echoes the prompt back.
pub struct EchoGenerator {
    pub calls: AtomicUsize,
}

impl EchoGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> research_assistant::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("echo: {}", prompt))
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> research_assistant::Result<String> {
        Err(AssistantError::LlmError("connection reset".to_string()))
    }
}

pub fn eiffel_result() -> StructuredResult {
    StructuredResult {
        topic: "Eiffel Tower".to_string(),
        summary: "Built for the 1889 World's Fair in Paris.".to_string(),
        sources: vec!["https://en.wikipedia.org/wiki/Eiffel_Tower".to_string()],
        tools_used: vec!["wikipedia".to_string()],
    }
}

pub fn eiffel_json() -> String {
    serde_json::to_string(&eiffel_result()).unwrap()
}

pub fn assistant(agent: Arc<FixedAgent>, generator: Arc<EchoGenerator>) -> Assistant {
    Assistant::new(agent, generator)
}
