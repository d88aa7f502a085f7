//! LLM client for the Groq chat-completions API
//!
//! Serves both the plain conversational call and the tool-calling agent.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::models::{ChatMessage, Role};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

/// Opaque text generation: prompt in, text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// One chat-completion round trip with optional tool schemas.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[WireMessage], tools: &[Value]) -> Result<WireMessage>;
}

//
// ================= Wire Format =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn requested_tools(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_wire().to_string(),
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, as sent by the model.
    pub arguments: String,
}

fn no_tools(tools: &&[Value]) -> bool {
    tools.is_empty()
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Value],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

//
// ================= Client =================
//

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, messages: &[WireMessage], tools: &[Value]) -> Result<WireMessage> {
        if self.api_key.is_empty() {
            return Err(AssistantError::ConfigError(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
            tools,
            temperature: 0.2,
        };

        info!(model = %self.model, messages = messages.len(), tools = tools.len(), "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LLM request failed: {}", e);
                AssistantError::LlmError(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("LLM error response ({}): {}", status, error_text);
            return Err(AssistantError::LlmError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse LLM response: {}", e);
            AssistantError::LlmError(format!("response parse error: {}", e))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::LlmError("No choices in response".to_string()))?;

        info!(finish_reason = ?choice.finish_reason, "LLM response received");

        Ok(choice.message)
    }
}

#[async_trait]
impl Generator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = [WireMessage::from(&ChatMessage::new(Role::Human, prompt))];
        let reply = self.complete(&messages, &[]).await?;
        Ok(reply.content.unwrap_or_default())
    }
}
