//! Environment configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binaries via `dotenv`.

use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_OUTPUT_PATH: &str = "research_output.txt";

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub output_path: PathBuf,
    pub wiki_top_k: usize,
    pub wiki_max_chars: usize,
    pub agent_max_iterations: usize,
    pub port: u16,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            wiki_top_k: 1,
            wiki_max_chars: 100,
            agent_max_iterations: 8,
            port: 8080,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_key: get("GROQ_API_KEY").unwrap_or(defaults.api_key),
            base_url: get("GROQ_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: get("RESEARCH_MODEL").unwrap_or(defaults.model),
            output_path: get("RESEARCH_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            wiki_top_k: parse_or(get("WIKI_TOP_K_RESULTS"), "WIKI_TOP_K_RESULTS", defaults.wiki_top_k)?,
            wiki_max_chars: parse_or(get("WIKI_MAX_CHARS"), "WIKI_MAX_CHARS", defaults.wiki_max_chars)?,
            agent_max_iterations: parse_or(
                get("AGENT_MAX_ITERATIONS"),
                "AGENT_MAX_ITERATIONS",
                defaults.agent_max_iterations,
            )?,
            port: parse_or(get("PORT").or_else(|| get("API_PORT")), "PORT", defaults.port)?,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AssistantError::ConfigError(format!("{} has an invalid value: {}", key, raw))
        }),
    }
}
