use std::{collections::HashMap, sync::Arc, time::Instant};

mod models;
pub use models::*;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    journey::Planner,
    shared::{
        geo::{Coordinate, Distance},
        time::Time,
    },
};

/// In-memory snapshot of one extracted feed.
///
/// Immutable once built. A refresh builds a new repository and swaps it in
/// whole, so readers never observe a half updated snapshot.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub stops: Box<[Stop]>,

    stop_lookup: HashMap<Arc<str>, u32>,
    // Sorted by departure time
    stop_to_departures: Box<[Box<[Departure]>]>,
    // Sorted by stop sequence
    trip_to_calls: HashMap<Arc<str>, Box<[TripCall]>>,
}

impl Repository {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the lookup tables for a stop catalog and departure index.
    /// Departures whose stop is missing from the catalog are dropped.
    pub fn with_snapshot(mut self, stops: Vec<Stop>, departures: DepartureIndex) -> Self {
        self.load_stops(stops);
        self.load_departures(departures);
        self.generate_trip_calls();
        self
    }

    fn load_stops(&mut self, stops: Vec<Stop>) {
        debug!("Loading stops...");
        let now = Instant::now();
        let mut stop_lookup: HashMap<Arc<str>, u32> = HashMap::with_capacity(stops.len());
        let mut unique: Vec<Stop> = Vec::with_capacity(stops.len());
        stops.into_iter().for_each(|stop| {
            if stop_lookup.contains_key(&stop.id) {
                debug!("Ignoring duplicate stop {}", stop.id);
                return;
            }
            stop_lookup.insert(stop.id.clone(), unique.len() as u32);
            unique.push(stop);
        });
        self.stops = unique.into();
        self.stop_lookup = stop_lookup;
        debug!("Loading stops took {:?}", now.elapsed());
    }

    fn load_departures(&mut self, departures: DepartureIndex) {
        debug!("Loading departures...");
        let now = Instant::now();
        let mut stop_to_departures: Vec<Vec<Departure>> = vec![Vec::new(); self.stops.len()];
        let mut dangling = 0;
        departures.into_iter().for_each(|(stop_id, values)| {
            match self.stop_lookup.get(&stop_id) {
                Some(stop_idx) => stop_to_departures[*stop_idx as usize].extend(values),
                None => dangling += values.len(),
            }
        });
        if dangling > 0 {
            debug!("Dropped {dangling} departures with unknown stops");
        }

        stop_to_departures
            .par_iter_mut()
            .for_each(|values| values.sort_by_key(|departure| departure.departure_secs));
        self.stop_to_departures = stop_to_departures
            .into_iter()
            .map(|values| values.into())
            .collect();
        debug!("Loading departures took {:?}", now.elapsed());
    }

    fn generate_trip_calls(&mut self) {
        debug!("Generating trip calls...");
        let now = Instant::now();
        let mut trip_to_calls: HashMap<Arc<str>, Vec<TripCall>> = HashMap::new();
        self.stop_to_departures
            .iter()
            .enumerate()
            .for_each(|(stop_idx, departures)| {
                departures.iter().for_each(|departure| {
                    trip_to_calls
                        .entry(departure.trip_id.clone())
                        .or_default()
                        .push(TripCall {
                            stop_idx: stop_idx as u32,
                            sequence: departure.stop_sequence,
                            departure: departure.time(),
                        });
                });
            });
        trip_to_calls
            .par_iter_mut()
            .for_each(|(_, calls)| calls.sort_by_key(|call| call.sequence));
        self.trip_to_calls = trip_to_calls
            .into_iter()
            .map(|(trip_id, calls)| (trip_id, calls.into()))
            .collect();
        debug!("Generating trip calls took {:?}", now.elapsed());
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_to_calls.len()
    }

    pub fn departure_count(&self) -> usize {
        self.stop_to_departures.iter().map(|values| values.len()).sum()
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let stop_idx = self.stop_lookup.get(id)?;
        Some(&self.stops[*stop_idx as usize])
    }

    pub fn stop_idx_by_id(&self, id: &str) -> Option<u32> {
        self.stop_lookup.get(id).copied()
    }

    pub fn stop_by_idx(&self, idx: u32) -> &Stop {
        &self.stops[idx as usize]
    }

    /// Returns stops around `coordinate` closest first.
    ///
    /// Scans the whole catalog. When `radius` is set stops further away are
    /// left out, then the result is cut to `limit` entries.
    pub fn stops_by_coordinate(
        &self,
        coordinate: &Coordinate,
        radius: Option<Distance>,
        limit: usize,
    ) -> Vec<NearbyStop<'_>> {
        let mut nearby: Vec<NearbyStop<'_>> = self
            .stops
            .par_iter()
            .enumerate()
            .map(|(i, stop)| NearbyStop {
                index: i as u32,
                stop,
                distance: stop.coordinate.distance(coordinate),
            })
            .filter(|nearby| radius.is_none_or(|radius| nearby.distance <= radius))
            .collect();
        nearby.par_sort_by(|a, b| a.distance.total_cmp(&b.distance));
        nearby.truncate(limit);
        nearby
    }

    /// The next `count` departures at a stop leaving at or after `now`,
    /// earliest first. No day rollover is applied to `now`.
    pub fn next_departures(&self, stop_idx: u32, now: Time, count: usize) -> &[Departure] {
        let Some(departures) = self.stop_to_departures.get(stop_idx as usize) else {
            return &[];
        };
        let start =
            departures.partition_point(|departure| departure.departure_secs < now.as_seconds());
        let end = departures.len().min(start.saturating_add(count));
        &departures[start..end]
    }

    pub fn next_departures_by_stop_id(&self, stop_id: &str, now: Time, count: usize) -> &[Departure] {
        match self.stop_idx_by_id(stop_id) {
            Some(stop_idx) => self.next_departures(stop_idx, now, count),
            None => &[],
        }
    }

    /// Every call of a trip ordered by stop sequence.
    /// Unknown trips have no calls.
    pub fn calls_by_trip_id(&self, trip_id: &str) -> &[TripCall] {
        self.trip_to_calls
            .get(trip_id)
            .map(|calls| calls.as_ref())
            .unwrap_or(&[])
    }

    pub fn planner(&'_ self, origin: Coordinate, destination: Coordinate) -> Planner<'_> {
        Planner::new(self, origin, destination)
    }
}
