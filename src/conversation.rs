//! Conversational interaction handler
//!
//! Handles queries that need no research: the raw query is the whole prompt
//! (no system instruction) and the model's text comes back verbatim.

use crate::llm::Generator;
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub struct ConversationHandler {
    generator: Arc<dyn Generator>,
}

impl ConversationHandler {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn converse(&self, query: &str) -> Result<String> {
        info!(query_len = query.len(), "Conversational: calling generator");
        self.generator.generate(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(AssistantError::LlmError("unauthorized".to_string()))
            } else {
                Ok(format!("  reply to {}\n", prompt))
            }
        }
    }

    #[tokio::test]
    async fn test_prompt_is_raw_query_and_reply_is_verbatim() {
        let generator = Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        });
        let handler = ConversationHandler::new(generator.clone());

        let reply = handler.converse("hello, how are you").await.unwrap();
        assert_eq!(reply, "  reply to hello, how are you\n");
        assert_eq!(
            *generator.prompts.lock().unwrap(),
            vec!["hello, how are you".to_string()]
        );
    }

    #[tokio::test]
    async fn test_errors_propagate_to_caller() {
        let handler = ConversationHandler::new(Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }));

        let err = handler.converse("hi").await.unwrap_err();
        assert!(err.to_string().contains("unauthorized"));
    }
}
