//! REST API for spreadsheet cell content and styling
//!
//! Endpoints take a multipart upload (`file`, optional `sheet_name`):
//! - `POST /api/sheets`: sheet names in document order
//! - `POST /api/analyze-sheet`: non-empty cells of one sheet with styles
//! - `POST /api/analyze-sheet/markdown`: the same, as a Markdown table

pub mod config;
mod handlers;
mod types;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use handlers::*;
pub use types::*;

/// Build the API router with all endpoints
pub fn build_router(config: &ServerConfig) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Workbook endpoints
        .route("/api/sheets", post(list_sheets))
        .route("/api/analyze-sheet", post(analyze_sheet))
        .route("/api/analyze-sheet/markdown", post(analyze_sheet_markdown))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        // Any origin, method and header, with credentials
        .layer(CorsLayer::very_permissive())
}

/// Serve the API on an already bound listener
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> Result<(), std::io::Error> {
    let app = build_router(config);
    axum::serve(listener, app).await
}

/// Start the API server
pub async fn start_server(config: &ServerConfig) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", config.addr);

    let listener = TcpListener::bind(&config.addr).await?;
    serve(listener, config).await
}
