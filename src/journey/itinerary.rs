use serde::Serialize;
use std::sync::Arc;

use crate::{
    repository::NearbyStop,
    shared::{geo::Distance, time::Time},
};

/// One candidate way of travelling from the origin to the destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItineraryOption {
    Direct(DirectOption),
    Transfer(TransferOption),
}

/// A single trip serving both the origin and the destination stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectOption {
    pub origin_stop: Arc<str>,
    pub destination_stop: Arc<str>,
    pub trip_id: Arc<str>,
    pub departure: Time,
    pub arrival: Time,
    /// Walking approach at both ends, measured as the crow flies.
    pub distance: Distance,
}

/// Two trips joined at a transfer stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferOption {
    pub origin_stop: Arc<str>,
    pub transfer_stop: Arc<str>,
    pub destination_stop: Arc<str>,
    pub first_trip_id: Arc<str>,
    pub second_trip_id: Arc<str>,
    pub departure: Time,
    /// When the first trip reaches the transfer stop.
    pub transfer_arrival: Time,
    /// When the second trip leaves the transfer stop.
    pub transfer_departure: Time,
    pub arrival: Time,
    pub distance: Distance,
}

impl ItineraryOption {
    pub fn departure(&self) -> Time {
        match self {
            ItineraryOption::Direct(option) => option.departure,
            ItineraryOption::Transfer(option) => option.departure,
        }
    }

    pub fn arrival(&self) -> Time {
        match self {
            ItineraryOption::Direct(option) => option.arrival,
            ItineraryOption::Transfer(option) => option.arrival,
        }
    }

    pub fn distance(&self) -> Distance {
        match self {
            ItineraryOption::Direct(option) => option.distance,
            ItineraryOption::Transfer(option) => option.distance,
        }
    }

    pub fn origin_stop(&self) -> &str {
        match self {
            ItineraryOption::Direct(option) => &option.origin_stop,
            ItineraryOption::Transfer(option) => &option.origin_stop,
        }
    }

    pub fn destination_stop(&self) -> &str {
        match self {
            ItineraryOption::Direct(option) => &option.destination_stop,
            ItineraryOption::Transfer(option) => &option.destination_stop,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, ItineraryOption::Direct(_))
    }
}

/// Ranked options plus the stops considered nearest to each end.
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    pub options: Vec<ItineraryOption>,
    pub origin_stops: Vec<NearbyStop<'a>>,
    pub destination_stops: Vec<NearbyStop<'a>>,
}
