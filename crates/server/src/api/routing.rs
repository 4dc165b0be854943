use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use stopwise::{
    repository::Repository,
    shared::{geo::Coordinate, time::Time},
};

use crate::{
    api::{run_blocking, validate_coordinate},
    dto::PlanResponse,
    error::AppError,
    state::AppState,
};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub origin_coords: Option<LatLng>,
    pub destination_coords: Option<LatLng>,
    /// Seconds since midnight, defaults to the current local time.
    pub at: Option<u32>,
}

/// Direct and one-transfer options between two coordinates.
pub async fn route(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let Json(request) = request.map_err(|err| AppError::bad_request(err.body_text()))?;
    let (Some(origin), Some(destination)) = (request.origin_coords, request.destination_coords)
    else {
        return Err(AppError::bad_request(
            "Both originCoords and destinationCoords are required",
        ));
    };
    let origin = validate_coordinate("Origin", origin.lat, origin.lng)?;
    let destination = validate_coordinate("Destination", destination.lat, destination.lng)?;
    let now = request.at.map(Time::from_seconds).unwrap_or_else(Time::now);

    let repository = state.repository().await?;
    plan(&state, repository, origin, destination, now).await
}

/// Same search as [`route`] addressed with `from` and `to` query
/// parameters. Each is either `lat,lng` or a stop id.
pub async fn routing(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlanResponse>, AppError> {
    let repository = state.repository().await?;
    let from = params
        .get("from")
        .ok_or_else(|| AppError::bad_request("Missing from"))?;
    let to = params
        .get("to")
        .ok_or_else(|| AppError::bad_request("Missing to"))?;
    let origin = waypoint_from_str(&repository, from)?;
    let destination = waypoint_from_str(&repository, to)?;
    let now = match params.get("at") {
        Some(at) => Time::from_seconds(
            at.parse()
                .map_err(|_| AppError::bad_request(format!("Invalid at: {at}")))?,
        ),
        None => Time::now(),
    };
    plan(&state, repository, origin, destination, now).await
}

async fn plan(
    state: &AppState,
    repository: Arc<Repository>,
    origin: Coordinate,
    destination: Coordinate,
    now: Time,
) -> Result<Json<PlanResponse>, AppError> {
    let response = run_blocking(state, move || {
        let plan = repository
            .planner(origin, destination)
            .departure_at(now)
            .solve();
        PlanResponse::from(&plan, &repository, origin, destination, now)
    })
    .await?;
    Ok(Json(response))
}

fn waypoint_from_str(repository: &Repository, str: &str) -> Result<Coordinate, AppError> {
    if let Some((latitude, longitude)) = str.split_once(',') {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::bad_request(format!("Invalid coordinate: {str}")))
        };
        validate_coordinate("Waypoint", parse(latitude)?, parse(longitude)?)
    } else {
        repository
            .stop_by_id(str)
            .map(|stop| stop.coordinate)
            .ok_or_else(|| AppError::bad_request(format!("Unknown stop: {str}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::test_support::{DESTINATION, ORIGIN, empty_state, state_with_data},
        dto::ItineraryDto,
    };

    fn request(at: u32) -> Result<Json<PlanRequest>, JsonRejection> {
        Ok(Json(PlanRequest {
            origin_coords: Some(LatLng {
                lat: ORIGIN.0,
                lng: ORIGIN.1,
            }),
            destination_coords: Some(LatLng {
                lat: DESTINATION.0,
                lng: DESTINATION.1,
            }),
            at: Some(at),
        }))
    }

    #[tokio::test]
    async fn plans_direct_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data(dir.path());
        let Json(response) = route(State(state), request(3000)).await.unwrap();

        assert_eq!(response.options.len(), 1);
        let ItineraryDto::Direct {
            origin_stop,
            destination_stop,
            trip_id,
            departure,
            arrival,
            ..
        } = &response.options[0]
        else {
            panic!("expected a direct option");
        };
        assert_eq!(origin_stop.id, "A");
        assert_eq!(destination_stop.id, "B");
        assert_eq!(trip_id, "T1");
        assert_eq!(departure.secs, 3600);
        assert_eq!(arrival.time, "01:02:00");
        assert_eq!(response.origin_stops[0].stop.id, "A");
        assert_eq!(response.destination_stops[0].stop.id, "B");
    }

    #[tokio::test]
    async fn no_options_after_departure() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data(dir.path());
        let Json(response) = route(State(state), request(3601)).await.unwrap();
        assert!(response.options.is_empty());
    }

    #[tokio::test]
    async fn missing_coordinates_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data(dir.path());
        let result = route(
            State(state),
            Ok(Json(PlanRequest {
                origin_coords: Some(LatLng {
                    lat: ORIGIN.0,
                    lng: ORIGIN.1,
                }),
                destination_coords: None,
                at: None,
            })),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn missing_data_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = route(State(empty_state(dir.path())), request(3000)).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn routing_accepts_stop_ids() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data(dir.path());
        let params = HashMap::from([
            ("from".to_string(), "A".to_string()),
            ("to".to_string(), format!("{},{}", DESTINATION.0, DESTINATION.1)),
            ("at".to_string(), "3000".to_string()),
        ]);
        let Json(response) = routing(Query(params), State(state)).await.unwrap();
        assert_eq!(response.options.len(), 1);
    }

    #[tokio::test]
    async fn routing_rejects_unknown_stop() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data(dir.path());
        let params = HashMap::from([
            ("from".to_string(), "nowhere".to_string()),
            ("to".to_string(), "B".to_string()),
        ]);
        let result = routing(Query(params), State(state)).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }
}
