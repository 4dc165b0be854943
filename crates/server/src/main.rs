mod api;
mod config;
mod dto;
mod error;
mod refresh;
mod state;

use crate::{config::Config, state::AppState};
use std::{sync::Arc, time::Duration};
use stopwise::feed::Extraction;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting server...");
    let config = Config::from_env(std::env::args().skip(1));
    let port = config.port;
    let state = Arc::new(AppState::new(config));

    if let Some(archive) = state.config.archive.clone() {
        info!("Extracting {}", archive.display());
        match state.extract_local(archive).await {
            Ok(extraction) => log_extraction(&extraction),
            Err(err) => error!("Startup extraction failed: {err}"),
        }
    }

    if let Some(interval) = state.config.refresh_interval {
        if state.config.feed_url.is_some() {
            tokio::spawn(scheduled_refresh(state.clone(), interval));
        } else {
            warn!("Refresh interval set without STOPWISE_FEED_URL, scheduled refresh disabled");
        }
    }

    let app = api::router(state);
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
        std::process::exit(1);
    }
}

async fn scheduled_refresh(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // Artifacts already on disk are good until the first period elapses
    if state.store.version().is_ok() {
        interval.tick().await;
    }
    loop {
        interval.tick().await;
        info!("Scheduled refresh");
        match state.refresh(None).await {
            Ok(extraction) => log_extraction(&extraction),
            Err(err) => error!("Scheduled refresh failed: {err}"),
        }
    }
}

fn log_extraction(extraction: &Extraction) {
    match extraction {
        Extraction::Complete { stops, departures } => {
            info!("Extracted {stops} stops and {departures} departures")
        }
        Extraction::Partial { stops, error } => {
            warn!("Extracted {stops} stops, departures failed: {error}")
        }
    }
}
