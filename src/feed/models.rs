use serde::{Deserialize, Serialize};

/// Row of `stops.txt`. Columns not listed here are ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub zone_id: Option<String>,
}

/// Row of `stop_times.txt`. Columns not listed here are ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_id: String,
    pub stop_sequence: u32,
}

impl GtfsStopTime {
    /// The departure clock string, falling back to the arrival time when the
    /// departure column is blank.
    pub fn departure_clock(&self) -> Option<&str> {
        [&self.departure_time, &self.arrival_time]
            .into_iter()
            .filter_map(|time| time.as_deref())
            .map(str::trim)
            .find(|time| !time.is_empty())
    }
}
