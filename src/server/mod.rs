//! HTTP surface over the analysis pipeline.

mod handlers;
mod request;

pub use request::parse_request;

use crate::pipeline::Analyzer;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/fix", post(handlers::fix))
        .route("/api/history", get(handlers::history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { analyzer })
}

/// Serve until Ctrl-C, then flush pending history writes.
pub async fn serve(analyzer: Arc<Analyzer>, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(
        "Listening on http://{} (history: {})",
        listener.local_addr()?,
        analyzer.history().backend()
    );

    axum::serve(listener, router(analyzer.clone()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    analyzer.history().shutdown().await;
    Ok(())
}
