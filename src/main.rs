use anyhow::Result;
use codeverter::{config::Config, languages::LanguageCatalog, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("codeverter=info".parse()?),
        )
        .init();

    info!("Starting CodeVerter");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Using model {} at {} ({} languages available)",
        config.model,
        config.anthropic_api_url,
        LanguageCatalog::get().len()
    );
    if config.api_key.is_none() {
        info!("API_KEY not set, API is open to anyone who can reach it");
    }

    server::serve(config).await
}
