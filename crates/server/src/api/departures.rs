use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use std::sync::Arc;
use stopwise::shared::{geo::Distance, time::Time};

use crate::{
    api::{run_blocking, validate_coordinate},
    dto::{DeparturesResponse, StopDeparturesDto},
    error::AppError,
    state::AppState,
};

const DEFAULT_RADIUS: f64 = 500.0;
const NEARBY_STOPS: usize = 10;
const DEPARTURES_PER_STOP: usize = 5;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius: Option<f64>,
    /// Seconds since midnight, defaults to the current local time.
    pub at: Option<u32>,
}

/// Upcoming departures from the stops closest to a point.
pub async fn departures(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let Query(params) = params.map_err(|err| AppError::bad_request(err.body_text()))?;
    let origin = validate_coordinate("Origin", params.lat, params.lng)?;
    let radius = params.radius.unwrap_or(DEFAULT_RADIUS);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(AppError::bad_request(format!(
            "Radius must be a positive number of meters: {radius}"
        )));
    }
    let now = params.at.map(Time::from_seconds).unwrap_or_else(Time::now);

    let repository = state.repository().await?;
    let response = run_blocking(&state, move || {
        let stops: Vec<_> = repository
            .stops_by_coordinate(&origin, Some(Distance::from_meters(radius)), NEARBY_STOPS)
            .iter()
            .map(|nearby| {
                let departures =
                    repository.next_departures(nearby.index, now, DEPARTURES_PER_STOP);
                StopDeparturesDto::from(nearby, departures)
            })
            .collect();
        DeparturesResponse {
            origin: origin.into(),
            radius_m: radius,
            now: now.as_seconds(),
            count: stops.len(),
            stops,
        }
    })
    .await?;
    Ok(Json(response))
}
