//! Core data models for the research assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Structured Result =================
//

/// Normalized research answer.
///
/// Deserializing this type directly is the strict path: all four fields must
/// be present with the right JSON types. Lenient recovery lives in the
/// normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub topic: String,
    pub summary: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
}

impl StructuredResult {
    /// Schema description embedded in the research system prompt.
    pub fn format_instructions() -> &'static str {
        r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"title": "Foo", "description": "a list of strings", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Here is the output schema:
```
{"properties": {"topic": {"title": "Topic", "type": "string"}, "summary": {"title": "Summary", "type": "string"}, "sources": {"title": "Sources", "type": "array", "items": {"type": "string"}}, "tools_used": {"title": "Tools Used", "type": "array", "items": {"type": "string"}}}, "required": ["topic", "summary", "sources", "tools_used"]}
```"#
    }
}

impl fmt::Display for StructuredResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Topic: {}", self.topic)?;
        writeln!(f, "Summary: {}", self.summary)?;
        writeln!(f, "Sources: {}", self.sources.join(", "))?;
        write!(f, "Tools used: {}", self.tools_used.join(", "))
    }
}

//
// ================= Messages =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
    Tool,
}

impl Role {
    /// Role name on the OpenAI-compatible wire format.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// Transcript returned by an agent invocation.
///
/// Messages are chronological. The last assistant-authored entry is the
/// agent's answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReply {
    pub messages: Vec<ChatMessage>,
}

impl AgentReply {
    pub fn final_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

//
// ================= History =================
//

/// One completed request. Exactly one of `structured` or `response` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    query: String,
    structured: Option<StructuredResult>,
    response: Option<String>,
    created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn structured(query: impl Into<String>, result: StructuredResult) -> Self {
        Self {
            query: query.into(),
            structured: Some(result),
            response: None,
            created_at: Utc::now(),
        }
    }

    pub fn response(query: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            structured: None,
            response: Some(text.into()),
            created_at: Utc::now(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn structured_result(&self) -> Option<&StructuredResult> {
        self.structured.as_ref()
    }

    pub fn response_text(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
