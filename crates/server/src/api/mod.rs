mod departures;
mod feed;
mod routing;

pub use departures::*;
pub use feed::*;
pub use routing::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use stopwise::shared::geo::Coordinate;

use crate::{error::AppError, state::AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departures", get(departures))
        .route("/route", post(route))
        .route("/routing", get(routing))
        .route("/age", get(age))
        .route("/refresh", post(refresh))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "OK"
}

/// Runs CPU bound query work off the async runtime, bounded by the
/// configured request timeout.
pub(crate) async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(
        state.config.request_timeout,
        tokio::task::spawn_blocking(f),
    )
    .await
    {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AppError::internal(format!("Query task failed: {err}"))),
        Err(_) => Err(AppError::Timeout),
    }
}

pub(crate) fn validate_coordinate(name: &str, lat: f64, lng: f64) -> Result<Coordinate, AppError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::bad_request(format!("{name} latitude out of range: {lat}")));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::bad_request(format!("{name} longitude out of range: {lng}")));
    }
    Ok(Coordinate::new(lat, lng))
}
