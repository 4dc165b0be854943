pub mod itinerary;

pub use itinerary::*;

use std::time::Instant;
use tracing::debug;

use crate::{
    repository::{Departure, NearbyStop, Repository, TripCall},
    shared::{
        geo::{Coordinate, Distance},
        time::{Duration, Time},
    },
};

/// Minimum time between reaching a transfer stop and boarding the next trip.
pub const TRANSFER_BUFFER: Duration = Duration::from_seconds(30);

/// Fan-out limits of the search.
///
/// The defaults bound the work done per query. Raising them finds more
/// options at the cost of latency.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Candidate stops looked at around each end.
    pub candidate_stops: usize,
    /// How far a candidate stop may be from its end point.
    pub candidate_radius: Distance,
    /// Departures taken from each origin stop.
    pub origin_departures: usize,
    /// Connecting departures taken at each transfer stop.
    pub transfer_departures: usize,
    /// Options returned after ranking.
    pub max_results: usize,
    /// Nearest stops echoed back per end.
    pub nearest_stops: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_stops: 8,
            candidate_radius: Distance::from_meters(2000.0),
            origin_departures: 20,
            transfer_departures: 12,
            max_results: 10,
            nearest_stops: 5,
        }
    }
}

/// Bounded direct and one-transfer search between two coordinates.
///
/// This is not an exhaustive profile search, an itinerary whose trip or
/// stop falls outside the candidate windows is never found.
pub struct Planner<'a> {
    repository: &'a Repository,
    origin: Coordinate,
    destination: Coordinate,
    departure: Time,
    config: SearchConfig,
}

impl<'a> Planner<'a> {
    pub fn new(repository: &'a Repository, origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            repository,
            origin,
            destination,
            departure: Time::now(),
            config: SearchConfig::default(),
        }
    }

    pub fn departure_at(mut self, departure: Time) -> Self {
        self.departure = departure;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solve(self) -> Plan<'a> {
        let now = Instant::now();
        let origin_stops = self.candidates(&self.origin);
        let destination_stops = self.candidates(&self.destination);
        debug!(
            "Got {} origin and {} destination candidates",
            origin_stops.len(),
            destination_stops.len()
        );

        let mut options: Vec<ItineraryOption> = Vec::new();
        for origin in origin_stops.iter() {
            let departures = self.repository.next_departures(
                origin.index,
                self.departure,
                self.config.origin_departures,
            );
            for departure in departures {
                let calls = self.calls_after(&departure.trip_id, departure.stop_sequence);
                self.direct_options(origin, departure, calls, &destination_stops, &mut options);
                self.transfer_options(origin, departure, calls, &destination_stops, &mut options);
            }
        }
        debug!("Found {} options", options.len());

        // Stable, options leaving at the same time keep discovery order
        options.sort_by_key(|option| option.departure());
        options.truncate(self.config.max_results);

        let plan = Plan {
            options,
            origin_stops: origin_stops
                .into_iter()
                .take(self.config.nearest_stops)
                .collect(),
            destination_stops: destination_stops
                .into_iter()
                .take(self.config.nearest_stops)
                .collect(),
        };
        debug!("Solving took {:?}", now.elapsed());
        plan
    }

    fn candidates(&self, coordinate: &Coordinate) -> Vec<NearbyStop<'a>> {
        self.repository.stops_by_coordinate(
            coordinate,
            Some(self.config.candidate_radius),
            self.config.candidate_stops,
        )
    }

    /// Calls of `trip_id` strictly after `sequence`.
    fn calls_after(&self, trip_id: &str, sequence: u32) -> &'a [TripCall] {
        let calls = self.repository.calls_by_trip_id(trip_id);
        let start = calls.partition_point(|call| call.sequence <= sequence);
        &calls[start..]
    }

    fn direct_options(
        &self,
        origin: &NearbyStop<'a>,
        departure: &Departure,
        calls: &[TripCall],
        destinations: &[NearbyStop<'a>],
        options: &mut Vec<ItineraryOption>,
    ) {
        for destination in destinations {
            let Some(call) = calls
                .iter()
                .find(|call| call.stop_idx == destination.index)
            else {
                continue;
            };
            if call.departure <= departure.time() {
                continue;
            }
            options.push(ItineraryOption::Direct(DirectOption {
                origin_stop: origin.stop.id.clone(),
                destination_stop: destination.stop.id.clone(),
                trip_id: departure.trip_id.clone(),
                departure: departure.time(),
                arrival: call.departure,
                distance: origin.distance + destination.distance,
            }));
        }
    }

    fn transfer_options(
        &self,
        origin: &NearbyStop<'a>,
        departure: &Departure,
        calls: &[TripCall],
        destinations: &[NearbyStop<'a>],
        options: &mut Vec<ItineraryOption>,
    ) {
        for transfer in calls {
            let ready = transfer.departure + TRANSFER_BUFFER;
            let connections = self
                .repository
                .next_departures(transfer.stop_idx, ready, usize::MAX)
                .iter()
                .filter(|connection| connection.trip_id != departure.trip_id)
                .take(self.config.transfer_departures);
            for connection in connections {
                let onward = self.calls_after(&connection.trip_id, connection.stop_sequence);
                for destination in destinations {
                    let Some(call) = onward
                        .iter()
                        .find(|call| call.stop_idx == destination.index)
                    else {
                        continue;
                    };
                    if call.departure <= connection.time() {
                        continue;
                    }
                    let transfer_stop = self.repository.stop_by_idx(transfer.stop_idx);
                    options.push(ItineraryOption::Transfer(TransferOption {
                        origin_stop: origin.stop.id.clone(),
                        transfer_stop: transfer_stop.id.clone(),
                        destination_stop: destination.stop.id.clone(),
                        first_trip_id: departure.trip_id.clone(),
                        second_trip_id: connection.trip_id.clone(),
                        departure: departure.time(),
                        transfer_arrival: transfer.departure,
                        transfer_departure: connection.time(),
                        arrival: call.departure,
                        distance: origin.distance + destination.distance,
                    }));
                }
            }
        }
    }
}
