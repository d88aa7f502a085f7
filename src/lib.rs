//! Research Assistant
//!
//! A chat assistant that:
//! - Classifies each query as research or conversational by keyword
//! - Sends research queries to a tool-using agent (web search, Wikipedia, save-to-file)
//! - Normalizes the agent's answer into a structured record, tolerating sloppy JSON
//! - Answers conversational queries with a plain LLM call
//! - Keeps an ordered per-session history of outcomes
//!
//! PIPELINE:
//! QUERY → CLASSIFY → {RESEARCH → NORMALIZE | CONVERSE} → HISTORY

pub mod agent;
pub mod api;
pub mod assistant;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod models;
pub mod normalizer;
pub mod research;
pub mod state;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use assistant::Assistant;
pub use classifier::{QueryClassifier, QueryKind};
pub use normalizer::{normalize, NotParseable};
pub use research::{ResearchFailure, ResearchOrchestrator};
pub use state::{HistoryStore, SessionState};
