//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the booking REST API on its own, without the workspace runner.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `booking-run` binary additionally
//! loads `.env` before serving.

use booking_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the booking REST API server
///
/// # Environment Variables
/// - `BOOKING_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `BOOKING_DATA_DIR`: Directory for the file-backed store (default: "booking_data")
/// - `BOOKING_STORE`: `file` or `memory` (default: "file")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("booking_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("BOOKING_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::from_env_values(
        std::env::var("BOOKING_DATA_DIR").ok(),
        std::env::var("BOOKING_STORE").ok(),
    )?;

    tracing::info!("-- Starting booking REST API on {}", addr);

    api_rest::serve(Arc::new(cfg), &addr).await
}
