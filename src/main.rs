use booking_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the booking application
///
/// Loads `.env`, resolves configuration once, then serves the REST API.
///
/// # Environment Variables
/// - `BOOKING_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `BOOKING_DATA_DIR`: Directory for the file-backed store (default: "booking_data")
/// - `BOOKING_STORE`: `file` or `memory` (default: "file")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("booking_run=info".parse()?)
                .add_directive("booking_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("BOOKING_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = CoreConfig::from_env_values(
        std::env::var("BOOKING_DATA_DIR").ok(),
        std::env::var("BOOKING_STORE").ok(),
    )?;

    tracing::info!("++ Starting booking REST on {}", rest_addr);

    api_rest::serve(Arc::new(cfg), &rest_addr).await
}
