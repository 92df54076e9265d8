//! GlucoGuard risk scoring server
//!
//! Loads the trained model artifact once, then serves predictions over
//! HTTP. If the artifact is missing or corrupt the server still starts
//! and answers every request with the neutral fallback probability.
//!
//! # Usage
//!
//! ```bash
//! # Train the model first (writes model.json + scaler.json)
//! cargo run --release --bin train
//!
//! # Start the server
//! cargo run --release
//! ```
//!
//! # Environment Variables
//!
//! - `GLUCOGUARD_SERVER_ADDR`: bind address (default: 0.0.0.0:8080)
//! - `GLUCOGUARD_MODEL_DIR`: artifact directory (default: ./model)
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use glucoguard::api::{create_app, ApiState};
use glucoguard::predictor::ModelContext;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "glucoguard")]
#[command(about = "GlucoGuard diabetes risk scoring server")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the model artifact directory (default: "./model")
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration, CLI flags over environment over defaults.
#[derive(Debug, Clone)]
struct AppConfig {
    server_addr: String,
    model_dir: PathBuf,
}

impl AppConfig {
    fn resolve(args: &CliArgs) -> Self {
        let server_addr = args.addr.clone().unwrap_or_else(|| {
            std::env::var("GLUCOGUARD_SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        });
        let model_dir = args.model_dir.clone().unwrap_or_else(|| {
            std::env::var("GLUCOGUARD_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./model"))
        });
        Self {
            server_addr,
            model_dir,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = AppConfig::resolve(&args);

    // One-time artifact load; the result is frozen for the process
    // lifetime. Absence degrades to fallback mode, it never aborts.
    let context = ModelContext::startup(&config.model_dir);
    if context.has_model() {
        info!(dir = %config.model_dir.display(), "Serving with trained model");
    }

    let app = create_app(ApiState::new(context));

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;
    info!(addr = %config.server_addr, "GlucoGuard server listening");

    axum::serve(listener, app)
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}
