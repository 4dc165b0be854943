use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    feed::{
        self, Config, FeedArchive,
        models::{GtfsStop, GtfsStopTime},
    },
    repository::{Departure, DepartureIndex, Stop},
    shared::time::Time,
    store::Store,
};

/// Result of a full extraction run.
#[derive(Debug)]
pub enum Extraction {
    /// Both artifacts were rewritten.
    Complete { stops: usize, departures: usize },
    /// The stop catalog was rewritten but departures failed.
    /// The previous departure artifact, if any, is left in place.
    Partial { stops: usize, error: feed::Error },
}

impl Extraction {
    pub fn stop_count(&self) -> usize {
        match self {
            Extraction::Complete { stops, .. } | Extraction::Partial { stops, .. } => *stops,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete { .. })
    }
}

/// Parses the stop table into the normalized catalog.
pub fn parse_stops(archive: &FeedArchive, config: &Config) -> Result<Vec<Stop>, feed::Error> {
    debug!("Parsing stops...");
    let now = Instant::now();
    let mut seen: HashSet<String> = HashSet::new();
    let mut outside = 0;
    let mut stops: Vec<Stop> = Vec::new();
    archive.stream_table(&config.stops_file_name, |(_, stop): (usize, GtfsStop)| {
        if !seen.insert(stop.stop_id.clone()) {
            return;
        }
        let value: Stop = stop.into();
        if let Some(area) = &config.area
            && !area.contains(&value.coordinate)
        {
            outside += 1;
            return;
        }
        stops.push(value);
    })?;
    if outside > 0 {
        debug!("Left out {outside} stops outside the configured area");
    }
    debug!("Parsing {} stops took {:?}", stops.len(), now.elapsed());
    Ok(stops)
}

/// Streams the stop time table into a departure index keyed by stop id.
/// Rows referencing a stop missing from `stops` are dropped.
pub fn parse_departures(
    archive: &FeedArchive,
    config: &Config,
    stops: &[Stop],
) -> Result<DepartureIndex, feed::Error> {
    debug!("Parsing departures...");
    let now = Instant::now();
    let stop_ids: HashMap<&str, Arc<str>> = stops
        .iter()
        .map(|stop| (stop.id.as_ref(), stop.id.clone()))
        .collect();
    let mut trip_ids: HashSet<Arc<str>> = HashSet::new();
    let mut index = DepartureIndex::new();
    let mut dangling = 0;
    let mut untimed = 0;
    let mut count = 0;
    archive.stream_table(
        &config.stop_times_file_name,
        |(_, stop_time): (usize, GtfsStopTime)| {
            let Some(stop_id) = stop_ids.get(stop_time.stop_id.as_str()) else {
                dangling += 1;
                return;
            };
            let Some((clock, time)) = stop_time
                .departure_clock()
                .and_then(|clock| Time::from_hms(clock).map(|time| (clock, time)))
            else {
                untimed += 1;
                return;
            };
            let trip_id = match trip_ids.get(stop_time.trip_id.as_str()) {
                Some(trip_id) => trip_id.clone(),
                None => {
                    let trip_id: Arc<str> = stop_time.trip_id.as_str().into();
                    trip_ids.insert(trip_id.clone());
                    trip_id
                }
            };
            index.entry(stop_id.clone()).or_default().push(Departure {
                trip_id,
                stop_id: stop_id.clone(),
                departure_time: clock.into(),
                departure_secs: time.as_seconds(),
                stop_sequence: stop_time.stop_sequence,
            });
            count += 1;
        },
    )?;
    if dangling > 0 {
        debug!("Dropped {dangling} stop times with unknown stops");
    }
    if untimed > 0 {
        warn!("Dropped {untimed} stop times without a usable time");
    }
    debug!(
        "Parsing {count} departures over {} trips took {:?}",
        trip_ids.len(),
        now.elapsed()
    );
    Ok(index)
}

/// Parses and persists the stop catalog.
pub fn extract_stops(
    archive: &FeedArchive,
    config: &Config,
    store: &Store,
) -> Result<Vec<Stop>, feed::Error> {
    let stops = parse_stops(archive, config)?;
    store.write_stops(&stops)?;
    Ok(stops)
}

/// Parses and persists the departure index. Returns the departure count.
pub fn extract_departures(
    archive: &FeedArchive,
    config: &Config,
    stops: &[Stop],
    store: &Store,
) -> Result<usize, feed::Error> {
    let index = parse_departures(archive, config, stops)?;
    store.write_departures(&index)?;
    Ok(index.values().map(|departures| departures.len()).sum())
}

/// Extracts stops, then departures on a best effort basis.
///
/// A failing stop extraction fails the run. A failing departure extraction
/// yields [`Extraction::Partial`], nearby stop lookups still work off the
/// fresh catalog.
pub fn extract_archive(
    archive: &FeedArchive,
    config: &Config,
    store: &Store,
) -> Result<Extraction, feed::Error> {
    info!("Extracting {}", archive.path().display());
    let now = Instant::now();
    let stops = extract_stops(archive, config, store)?;
    let extraction = match extract_departures(archive, config, &stops, store) {
        Ok(departures) => Extraction::Complete {
            stops: stops.len(),
            departures,
        },
        Err(error) => {
            warn!("Departure extraction failed: {error}");
            Extraction::Partial {
                stops: stops.len(),
                error,
            }
        }
    };
    info!("Extraction finished in {:?}: {extraction:?}", now.elapsed());
    Ok(extraction)
}
