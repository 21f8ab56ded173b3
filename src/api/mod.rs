pub mod error;
pub mod handlers;
pub mod state;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use state::AppState;

/// Settings for `chain-board serve`.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Background refresh period; `None` disables the timer.
    pub refresh_every: Option<Duration>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(|| async { "ok" }))
        // Page
        .route("/", get(handlers::page::index))
        .route("/refresh", post(handlers::page::refresh))
        // JSON
        .route("/api/chain", get(handlers::chain::get_chain))
        .route("/api/chain/refresh", post(handlers::chain::refresh_chain))
        .route("/api/quote/{symbol}", get(handlers::chain::get_quote))
        .layer(cors)
        .with_state(state)
}

/// Start the periodic refresh task. Overlaps with manual refreshes are resolved by the cache.
pub fn spawn_refresh_timer(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let view = state.refresh().await;
            info!(available = view.is_available(), "timer refresh done");
        }
    })
}

pub async fn serve(config: &ServeConfig, state: AppState) -> Result<()> {
    let app = router(state.clone());

    if let Some(every) = config.refresh_every {
        info!(secs = every.as_secs(), "background refresh enabled");
        spawn_refresh_timer(state, every);
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    info!("chain-board listening on http://{addr}");
    println!("chain-board listening on {addr}");
    println!("  Page:    GET  http://{addr}/");
    println!("  Chain:   GET  http://{addr}/api/chain");
    println!("  Refresh: POST http://{addr}/api/chain/refresh");
    println!("  Quote:   GET  http://{addr}/api/quote/{{symbol}}");

    axum::serve(listener, app).await.context("running server")?;

    Ok(())
}
