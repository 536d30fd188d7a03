use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, info};
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    let dotenv = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(telemetry::exclude_this_crate()),
        )
        .with(telemetry::layer())
        .try_init()?;

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    api::start().await?;

    Ok(())
}
