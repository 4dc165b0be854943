use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    feed::models::GtfsStop,
    shared::{
        geo::{Coordinate, Distance},
        time::Time,
    },
};

/// Stop id to every departure serving that stop.
/// A `BTreeMap` keeps the persisted artifact in a stable key order.
pub type DepartureIndex = BTreeMap<Arc<str>, Vec<Departure>>;

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Short rider facing code, if the feed has one.
    pub code: Option<Arc<str>>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    pub coordinate: Coordinate,
    /// Fare zone.
    pub zone_id: Option<Arc<str>>,
}

impl From<GtfsStop> for Stop {
    fn from(value: GtfsStop) -> Self {
        Self {
            id: value.stop_id.into(),
            code: value.stop_code.map(|val| val.into()),
            name: value.stop_name.into(),
            coordinate: Coordinate::new(value.stop_lat, value.stop_lon),
            zone_id: value.zone_id.map(|val| val.into()),
        }
    }
}

/// One scheduled visit of a trip to a stop.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    pub trip_id: Arc<str>,
    pub stop_id: Arc<str>,
    /// Clock time exactly as written in the feed, e.g. `25:10:00`.
    pub departure_time: Arc<str>,
    /// Seconds since midnight of the service day.
    pub departure_secs: u32,
    /// The order of this stop within its trip.
    pub stop_sequence: u32,
}

impl Departure {
    pub fn time(&self) -> Time {
        Time::from_seconds(self.departure_secs)
    }
}

/// A stop in a trip's ordered call list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripCall {
    /// Internal index of the [`Stop`].
    pub stop_idx: u32,
    pub sequence: u32,
    pub departure: Time,
}

/// A stop returned by a spatial query along with its distance to the
/// query point.
#[derive(Debug, Clone, Copy)]
pub struct NearbyStop<'a> {
    pub index: u32,
    pub stop: &'a Stop,
    pub distance: Distance,
}
