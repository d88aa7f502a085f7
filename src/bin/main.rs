use research_assistant::state::is_dispatchable;
use research_assistant::{config::AssistantConfig, Assistant, ResearchFailure};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing (quiet by default so stdout stays readable)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AssistantConfig::from_env()?;
    let assistant = Assistant::from_config(&config)?;

    print!("What can I help you research? ");
    std::io::stdout().flush()?;

    let mut query = String::new();
    std::io::stdin().read_line(&mut query)?;
    let query = query.trim();
    if !is_dispatchable(query) {
        println!("No query given.");
        return Ok(());
    }

    info!(query = %query, "Running research");

    match assistant.research().research(query).await {
        Ok(result) => {
            println!("{}", result);
            Ok(())
        }
        Err(failure @ ResearchFailure::Agent(_)) => Err(failure.into()),
        Err(failure) => {
            println!("Agent Response: {}", failure.fallback_text());
            Ok(())
        }
    }
}
