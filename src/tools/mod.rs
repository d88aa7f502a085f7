//! Tool trait and registry
//!
//! Tools take a single string argument and return a string result. The agent
//! exposes them to the model as function schemas with one required parameter.

mod save;
mod search;
mod wikipedia;

pub use save::SaveTool;
pub use search::SearchTool;
pub use wikipedia::WikipediaTool;

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Trait for a single tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Name of the single string argument in the function schema.
    fn parameter(&self) -> &'static str {
        "query"
    }
    async fn run(&self, input: &str) -> Result<String>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Function schemas in the chat-completions `tools` format, sorted by name.
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": {
                            "type": "object",
                            "properties": {
                                tool.parameter(): { "type": "string" }
                            },
                            "required": [tool.parameter()]
                        }
                    }
                })
            })
            .collect()
    }

    /// Run a tool call whose arguments arrive as a JSON-encoded object.
    pub async fn execute_call(&self, name: &str, arguments: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| AssistantError::ToolNotFound(name.to_string()))?;

        let input = extract_argument(arguments, tool.parameter())?;
        debug!(tool = name, input_len = input.len(), "Executing tool");

        tool.run(&input).await.map_err(|e| {
            warn!(tool = name, "Tool failed: {}", e);
            e
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the string argument out of the model's argument object. A lone string
/// value under any key is accepted, as is a bare non-JSON string.
fn extract_argument(arguments: &str, parameter: &str) -> Result<String> {
    let parsed: Value = match serde_json::from_str(arguments) {
        Ok(value) => value,
        Err(_) if !arguments.trim().is_empty() => return Ok(arguments.trim().to_string()),
        Err(_) => {
            return Err(AssistantError::InvalidToolInput(
                "empty tool arguments".to_string(),
            ))
        }
    };

    match &parsed {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => {
            if let Some(value) = map.get(parameter) {
                return match value {
                    Value::String(s) => Ok(s.clone()),
                    other => Ok(other.to_string()),
                };
            }

            let mut strings = map.values().filter_map(Value::as_str);
            match (strings.next(), strings.next()) {
                (Some(only), None) => Ok(only.to_string()),
                _ => Err(AssistantError::InvalidToolInput(format!(
                    "expected '{}' in tool arguments",
                    parameter
                ))),
            }
        }
        _ => Err(AssistantError::InvalidToolInput(
            "tool arguments must be a JSON object".to_string(),
        )),
    }
}

/// Shared HTTP client for the web-backed tools.
pub(crate) fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("research-assistant/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Create the registry the research agent runs with.
pub fn create_default_registry(config: &AssistantConfig) -> Result<ToolRegistry> {
    let client = http_client()?;
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(SearchTool::new(client.clone())));
    registry.register(Arc::new(WikipediaTool::new(
        client,
        config.wiki_top_k,
        config.wiki_max_chars,
    )));
    registry.register(Arc::new(SaveTool::new(config.output_path.clone())));

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the input"
        }

        async fn run(&self, input: &str) -> Result<String> {
            Ok(format!("echo: {}", input))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_execute_call_with_named_argument() {
        let out = registry()
            .execute_call("echo", r#"{"query": "Mars"}"#)
            .await
            .unwrap();
        assert_eq!(out, "echo: Mars");
    }

    #[tokio::test]
    async fn test_execute_call_with_single_other_key() {
        let out = registry()
            .execute_call("echo", r#"{"q": "Venus"}"#)
            .await
            .unwrap();
        assert_eq!(out, "echo: Venus");
    }

    #[tokio::test]
    async fn test_execute_call_with_bare_string() {
        let out = registry().execute_call("echo", "Jupiter").await.unwrap();
        assert_eq!(out, "echo: Jupiter");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().execute_call("nope", "{}").await.unwrap_err();
        assert!(matches!(err, AssistantError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let err = registry()
            .execute_call("echo", r#"{"a": "x", "b": "y"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::InvalidToolInput(_)));
    }

    #[test]
    fn test_specs_shape() {
        let specs = registry().specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["function"]["name"], "echo");
        assert_eq!(specs[0]["function"]["parameters"]["required"][0], "query");
    }

    #[test]
    fn test_default_registry_tools() {
        let registry = create_default_registry(&AssistantConfig::default()).unwrap();
        assert_eq!(
            registry.list(),
            vec!["save_tool", "search_tool", "wikipedia"]
        );
    }
}
