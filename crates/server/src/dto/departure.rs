use serde::Serialize;
use stopwise::repository::{Departure, NearbyStop};

use crate::dto::{CoordinateDto, NearbyStopDto};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureDto {
    pub trip_id: String,
    pub departure_time: String,
    pub departure_secs: u32,
    pub stop_sequence: u32,
}

impl DepartureDto {
    pub fn from(departure: &Departure) -> Self {
        Self {
            trip_id: departure.trip_id.to_string(),
            departure_time: departure.departure_time.to_string(),
            departure_secs: departure.departure_secs,
            stop_sequence: departure.stop_sequence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDeparturesDto {
    #[serde(flatten)]
    pub stop: NearbyStopDto,
    pub departures: Vec<DepartureDto>,
}

impl StopDeparturesDto {
    pub fn from(nearby: &NearbyStop, departures: &[Departure]) -> Self {
        Self {
            stop: NearbyStopDto::from(nearby),
            departures: departures.iter().map(DepartureDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesResponse {
    pub origin: CoordinateDto,
    pub radius_m: f64,
    pub now: u32,
    pub count: usize,
    pub stops: Vec<StopDeparturesDto>,
}
