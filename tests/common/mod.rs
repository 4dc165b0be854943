#![allow(dead_code)]

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use stopwise::{
    repository::{Departure, DepartureIndex, Repository, Stop},
    shared::Coordinate,
};
use zip::{ZipWriter, write::SimpleFileOptions};

/// Roughly 300 m of latitude.
pub const LAT_300_M: f64 = 300.0 / 111_195.0;
/// Roughly 5 km of latitude.
pub const LAT_5_KM: f64 = 5000.0 / 111_195.0;

pub const BASE: Coordinate = Coordinate::new(59.33, 18.06);

pub fn write_feed(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("feed.zip");
    let file = File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

pub fn stop(id: &str, latitude: f64, longitude: f64) -> Stop {
    Stop {
        id: id.into(),
        code: None,
        name: format!("Stop {id}").into(),
        coordinate: Coordinate::new(latitude, longitude),
        zone_id: None,
    }
}

/// A stop `offset` degrees of latitude north of [`BASE`].
pub fn stop_north(id: &str, offset: f64) -> Stop {
    stop(id, BASE.latitude + offset, BASE.longitude)
}

pub fn departure(trip_id: &str, stop_id: &str, secs: u32, sequence: u32) -> Departure {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    Departure {
        trip_id: trip_id.into(),
        stop_id: stop_id.into(),
        departure_time: format!("{h:02}:{m:02}:{s:02}").into(),
        departure_secs: secs,
        stop_sequence: sequence,
    }
}

pub fn index(departures: Vec<Departure>) -> DepartureIndex {
    let mut index = DepartureIndex::new();
    departures.into_iter().for_each(|departure| {
        index
            .entry(departure.stop_id.clone())
            .or_default()
            .push(departure);
    });
    index
}

pub fn repository(stops: Vec<Stop>, departures: Vec<Departure>) -> Repository {
    Repository::new().with_snapshot(stops, index(departures))
}
