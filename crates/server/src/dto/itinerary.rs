use serde::Serialize;
use stopwise::{
    journey::{ItineraryOption, Plan},
    repository::Repository,
    shared::{geo::Coordinate, time::Time},
};

use crate::dto::{CoordinateDto, NearbyStopDto};

/// A clock time in both its readable and its numeric form.
#[derive(Debug, Clone, Serialize)]
pub struct TimeDto {
    pub time: String,
    pub secs: u32,
}

impl From<Time> for TimeDto {
    fn from(value: Time) -> Self {
        Self {
            time: value.to_hms_string(),
            secs: value.as_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StopRefDto {
    pub id: String,
    pub name: String,
}

impl StopRefDto {
    pub fn from(stop_id: &str, repository: &Repository) -> Self {
        let name = repository
            .stop_by_id(stop_id)
            .map(|stop| stop.name.to_string())
            .unwrap_or_default();
        Self {
            id: stop_id.to_string(),
            name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItineraryDto {
    #[serde(rename_all = "camelCase")]
    Direct {
        origin_stop: StopRefDto,
        destination_stop: StopRefDto,
        trip_id: String,
        departure: TimeDto,
        arrival: TimeDto,
        distance_m: f64,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        origin_stop: StopRefDto,
        transfer_stop: StopRefDto,
        destination_stop: StopRefDto,
        first_trip_id: String,
        second_trip_id: String,
        departure: TimeDto,
        transfer_arrival: TimeDto,
        transfer_departure: TimeDto,
        arrival: TimeDto,
        distance_m: f64,
    },
}

impl ItineraryDto {
    pub fn from(option: &ItineraryOption, repository: &Repository) -> Self {
        match option {
            ItineraryOption::Direct(direct) => ItineraryDto::Direct {
                origin_stop: StopRefDto::from(&direct.origin_stop, repository),
                destination_stop: StopRefDto::from(&direct.destination_stop, repository),
                trip_id: direct.trip_id.to_string(),
                departure: direct.departure.into(),
                arrival: direct.arrival.into(),
                distance_m: direct.distance.as_meters().round(),
            },
            ItineraryOption::Transfer(transfer) => ItineraryDto::Transfer {
                origin_stop: StopRefDto::from(&transfer.origin_stop, repository),
                transfer_stop: StopRefDto::from(&transfer.transfer_stop, repository),
                destination_stop: StopRefDto::from(&transfer.destination_stop, repository),
                first_trip_id: transfer.first_trip_id.to_string(),
                second_trip_id: transfer.second_trip_id.to_string(),
                departure: transfer.departure.into(),
                transfer_arrival: transfer.transfer_arrival.into(),
                transfer_departure: transfer.transfer_departure.into(),
                arrival: transfer.arrival.into(),
                distance_m: transfer.distance.as_meters().round(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub origin: CoordinateDto,
    pub destination: CoordinateDto,
    pub now: u32,
    pub options: Vec<ItineraryDto>,
    pub origin_stops: Vec<NearbyStopDto>,
    pub destination_stops: Vec<NearbyStopDto>,
}

impl PlanResponse {
    pub fn from(
        plan: &Plan,
        repository: &Repository,
        origin: Coordinate,
        destination: Coordinate,
        now: Time,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            now: now.as_seconds(),
            options: plan
                .options
                .iter()
                .map(|option| ItineraryDto::from(option, repository))
                .collect(),
            origin_stops: plan.origin_stops.iter().map(NearbyStopDto::from).collect(),
            destination_stops: plan
                .destination_stops
                .iter()
                .map(NearbyStopDto::from)
                .collect(),
        }
    }
}
