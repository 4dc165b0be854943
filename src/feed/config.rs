use crate::shared::geo::{Coordinate, Distance};

#[derive(Debug, Clone)]
pub struct Config {
    pub stops_file_name: String,
    pub stop_times_file_name: String,
    /// Keep only stops inside this circle. Departures of dropped stops are
    /// dropped with them.
    pub area: Option<AreaFilter>,
}

#[derive(Debug, Clone, Copy)]
pub struct AreaFilter {
    pub center: Coordinate,
    pub radius: Distance,
}

impl AreaFilter {
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.center.distance(coordinate) <= self.radius
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stops_file_name: "stops.txt".into(),
            stop_times_file_name: "stop_times.txt".into(),
            area: None,
        }
    }
}

impl Config {
    pub fn with_area(mut self, center: Coordinate, radius: Distance) -> Self {
        self.area = Some(AreaFilter { center, radius });
        self
    }
}
