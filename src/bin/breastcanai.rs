use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use breastcanai::*;
use clap::Parser;
use std::path::PathBuf;
use tracing::*;

/// Serve the BreastCanAI ligand screening page.
#[derive(Parser, Debug)]
#[command(name = "breastcanai", version, about, long_about = None)]
struct Args {
    /// TOML config file (defaults to ./breastcanai.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model artifact, overriding the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Listen address, overriding the config
    #[arg(short, long)]
    bind: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::discover(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level);

    let model = LoadedModel::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;
    let model = web::Data::new(model);

    info!("Serving BreastCanAI on http://{}", config.bind);
    HttpServer::new(move || App::new().app_data(model.clone()).configure(configure))
        .bind(&config.bind)
        .with_context(|| format!("Failed to bind {}", config.bind))?
        .run()
        .await
        .context("Server error")
}
