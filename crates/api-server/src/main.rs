//! API Server Binary Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use sheetstyle_api_server::config::{DEFAULT_ADDR, DEFAULT_MAX_UPLOAD_MB};
use sheetstyle_api_server::{start_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sheetstyle-api-server")]
#[command(about = "HTTP API exposing spreadsheet cell content and styling")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "SHEETSTYLE_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Maximum upload size in MiB
    #[arg(long, env = "SHEETSTYLE_MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sheetstyle_api_server=info,sheetstyle_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ServerConfig::new(args.addr, args.max_upload_mb);

    tracing::info!("Starting spreadsheet style API server");
    start_server(&config)
        .await
        .with_context(|| format!("API server on {} failed", config.addr))?;

    Ok(())
}
