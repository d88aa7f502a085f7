use research_assistant::{api::start_server, config::AssistantConfig, Assistant};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AssistantConfig::from_env()?;
    if config.api_key.is_empty() {
        warn!("GROQ_API_KEY not set; LLM calls will fail until it is configured");
    }

    info!("Research Assistant - API Server");
    info!("Port: {}", config.port);

    let assistant = Arc::new(Assistant::from_config(&config)?);

    start_server(assistant, config.port).await?;

    Ok(())
}
