use serde::Serialize;
use stopwise::{
    repository::{NearbyStop, Stop},
    shared::geo::Coordinate,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CoordinateDto {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for CoordinateDto {
    fn from(value: Coordinate) -> Self {
        Self {
            lat: value.latitude,
            lng: value.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub coordinate: CoordinateDto,
}

impl StopDto {
    pub fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            code: stop.code.as_ref().map(|code| code.to_string()),
            name: stop.name.to_string(),
            coordinate: stop.coordinate.into(),
        }
    }
}

/// A stop together with how far it is from the queried point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStopDto {
    #[serde(flatten)]
    pub stop: StopDto,
    pub distance_m: f64,
}

impl NearbyStopDto {
    pub fn from(nearby: &NearbyStop) -> Self {
        Self {
            stop: StopDto::from(nearby.stop),
            distance_m: nearby.distance.as_meters().round(),
        }
    }
}
