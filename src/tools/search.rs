use super::Tool;
use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";
const MAX_SNIPPETS: usize = 5;

/// Web search backed by the DuckDuckGo Instant Answer API.
pub struct SearchTool {
    client: Client,
    base_url: String,
}

impl SearchTool {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DUCKDUCKGO_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    /// Grouped topics nest another level.
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}

fn collect_snippets(topics: &[RelatedTopic], out: &mut Vec<String>) {
    for topic in topics {
        if out.len() >= MAX_SNIPPETS {
            return;
        }
        if let Some(text) = topic.text.as_deref().filter(|t| !t.is_empty()) {
            match topic.first_url.as_deref() {
                Some(url) if !url.is_empty() => out.push(format!("{} ({})", text, url)),
                _ => out.push(text.to_string()),
            }
        }
        collect_snippets(&topic.topics, out);
    }
}

fn render(answer: &InstantAnswer) -> String {
    let mut parts = Vec::new();

    if !answer.answer.is_empty() {
        parts.push(answer.answer.clone());
    }
    if !answer.abstract_text.is_empty() {
        let mut line = if answer.heading.is_empty() {
            answer.abstract_text.clone()
        } else {
            format!("{}: {}", answer.heading, answer.abstract_text)
        };
        if !answer.abstract_url.is_empty() {
            line.push_str(&format!(" ({})", answer.abstract_url));
        }
        parts.push(line);
    }

    let mut snippets = Vec::new();
    collect_snippets(&answer.related_topics, &mut snippets);
    parts.extend(snippets);

    if parts.is_empty() {
        NO_RESULT.to_string()
    } else {
        parts.join("\n")
    }
}

#[async_trait::async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        "search_tool"
    }

    fn description(&self) -> &'static str {
        "Search the web for information."
    }

    async fn run(&self, input: &str) -> Result<String> {
        let query = input.trim();
        if query.is_empty() {
            return Err(AssistantError::InvalidToolInput(
                "search query is empty".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| AssistantError::ToolError(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::ToolError(format!(
                "search returned {}",
                status
            )));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| AssistantError::ToolError(format!("invalid search response: {}", e)))?;

        Ok(render(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_abstract_and_topics() {
        let answer: InstantAnswer = serde_json::from_value(json!({
            "Heading": "Eiffel Tower",
            "AbstractText": "Wrought-iron lattice tower in Paris.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Eiffel_Tower",
            "Answer": "",
            "RelatedTopics": [
                { "Text": "Gustave Eiffel - French engineer", "FirstURL": "https://duckduckgo.com/Gustave_Eiffel" },
                { "Name": "Landmarks", "Topics": [ { "Text": "Champ de Mars", "FirstURL": "" } ] }
            ]
        }))
        .unwrap();

        let rendered = render(&answer);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "Eiffel Tower: Wrought-iron lattice tower in Paris. (https://en.wikipedia.org/wiki/Eiffel_Tower)"
        );
        assert_eq!(
            lines[1],
            "Gustave Eiffel - French engineer (https://duckduckgo.com/Gustave_Eiffel)"
        );
        assert_eq!(lines[2], "Champ de Mars");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&InstantAnswer::default()), NO_RESULT);
    }

    #[test]
    fn test_snippets_capped() {
        let topics: Vec<RelatedTopic> = (0..10)
            .map(|i| RelatedTopic {
                text: Some(format!("topic {}", i)),
                first_url: None,
                topics: vec![],
            })
            .collect();
        let mut out = Vec::new();
        collect_snippets(&topics, &mut out);
        assert_eq!(out.len(), MAX_SNIPPETS);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let tool = SearchTool::new(Client::new());
        let err = tool.run("   ").await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidToolInput(_)));
    }
}
