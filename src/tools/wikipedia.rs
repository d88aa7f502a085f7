use super::Tool;
use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Encyclopedia lookup: search titles, then fetch plain-text intros.
pub struct WikipediaTool {
    client: Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(client: Client, top_k: usize, max_chars: usize) -> Self {
        Self {
            client,
            api_url: WIKIPEDIA_API.to_string(),
            top_k,
            max_chars,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| AssistantError::ToolError(format!("wikipedia request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::ToolError(format!(
                "wikipedia returned {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AssistantError::ToolError(format!("invalid wikipedia response: {}", e)))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k.to_string();
        let found: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .await?;

        Ok(found
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn intro(&self, title: &str) -> Result<Option<String>> {
        let pages: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(pages
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|page| page.extract)
            .filter(|extract| !extract.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

/// Join page summaries and cap the whole result at `max_chars` characters.
fn render(pages: &[(String, String)], max_chars: usize) -> String {
    if pages.is_empty() {
        return NO_RESULT.to_string();
    }

    let joined = pages
        .iter()
        .map(|(title, summary)| format!("Page: {}\nSummary: {}", title, summary.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    joined.chars().take(max_chars).collect()
}

#[async_trait::async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn description(&self) -> &'static str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query."
    }

    async fn run(&self, input: &str) -> Result<String> {
        let query = input.trim();
        if query.is_empty() {
            return Err(AssistantError::InvalidToolInput(
                "wikipedia query is empty".to_string(),
            ));
        }

        let mut pages = Vec::new();
        for title in self.search_titles(query).await?.into_iter().take(self.top_k) {
            if let Some(summary) = self.intro(&title).await? {
                pages.push((title, summary));
            }
        }

        Ok(render(&pages, self.max_chars))
    }
}
