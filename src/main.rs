// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use intrusion_detector::config::AppConfig;
use intrusion_detector::ml::ModelManager;
use intrusion_detector::observability;
use intrusion_detector::web::WebServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "intrusion_detector")]
#[command(about = "Autoencoder + SVM network intrusion classifier behind a web form", long_about = None)]
struct Args {
    /// Optional YAML config; built-in defaults are used without it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    observability::init_tracing(&config.observability)?;
    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    // Any missing or incompatible artifact stops startup here.
    let models = ModelManager::load(&config.ml).context("Failed to load model artifacts")?;

    WebServer::new(config.server.clone(), Arc::new(models))?
        .run()
        .await
}
