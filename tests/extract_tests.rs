mod common;

use std::fs;

use common::write_feed;
use stopwise::{
    feed::{self, Config, Extraction, FeedArchive, extract_archive, parse_departures, parse_stops},
    repository::{DepartureIndex, Stop},
    shared::{Coordinate, Distance},
    store::{self, Store},
};
use tempfile::tempdir;

const STOPS: &str = "stop_id,stop_code,stop_name,stop_lat,stop_lon,zone_id,wheelchair_boarding
A,1001,\"Central, Platform \"\"A\"\"\",59.3300,18.0600,Z1,1
B,,North Gate,59.3327,18.0600,,0
C,1003,Broken,not-a-number,18.0600,,
";

const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence,pickup_type
T1,08:00:00,08:00:00,A,1,0
T1,08:02:00,08:02:00,B,2,0
T2,24:58:00,25:10:00,B,1,0
T2,25:20:00,25:20:00,Z,2,0
T3,09:00:00,,A,1,0
T3,09:05:00,09:05:00,B,oops,0
";

#[test]
fn stops_are_normalized() {
    let dir = tempdir().unwrap();
    let archive = FeedArchive::open(write_feed(dir.path(), &[("stops.txt", STOPS)])).unwrap();
    let stops = parse_stops(&archive, &Config::default()).unwrap();

    assert_eq!(stops.len(), 2);
    let a = &stops[0];
    assert_eq!(&*a.id, "A");
    assert_eq!(&*a.name, "Central, Platform \"A\"");
    assert_eq!(a.code.as_deref(), Some("1001"));
    assert_eq!(a.zone_id.as_deref(), Some("Z1"));
    assert_eq!(a.coordinate, Coordinate::new(59.33, 18.06));
    let b = &stops[1];
    assert_eq!(b.code, None);
    assert_eq!(b.zone_id, None);
}

#[test]
fn nested_tables_are_found() {
    let dir = tempdir().unwrap();
    let path = write_feed(
        dir.path(),
        &[
            ("gtfs/stops.txt", STOPS),
            ("gtfs/stop_times.txt", STOP_TIMES),
        ],
    );
    let archive = FeedArchive::open(path).unwrap();
    let stops = parse_stops(&archive, &Config::default()).unwrap();
    assert_eq!(stops.len(), 2);
    let departures = parse_departures(&archive, &Config::default(), &stops).unwrap();
    assert!(!departures.is_empty());
}

#[test]
fn missing_stops_table() {
    let dir = tempdir().unwrap();
    let path = write_feed(dir.path(), &[("agency.txt", "agency_id\nX\n")]);
    let archive = FeedArchive::open(path).unwrap();
    let err = parse_stops(&archive, &Config::default()).unwrap_err();
    assert!(matches!(err, feed::Error::MissingTable(name) if name == "stops.txt"));
}

#[test]
fn departures_are_grouped_by_stop() {
    let dir = tempdir().unwrap();
    let path = write_feed(
        dir.path(),
        &[("stops.txt", STOPS), ("stop_times.txt", STOP_TIMES)],
    );
    let archive = FeedArchive::open(path).unwrap();
    let config = Config::default();
    let stops = parse_stops(&archive, &config).unwrap();
    let index = parse_departures(&archive, &config, &stops).unwrap();

    // Z is not a known stop and the row with sequence `oops` is malformed
    assert_eq!(index.keys().map(|id| id.to_string()).collect::<Vec<_>>(), vec!["A", "B"]);

    let a = &index["A"];
    assert_eq!(a.len(), 2);
    assert_eq!(&*a[0].trip_id, "T1");
    assert_eq!(a[0].departure_secs, 8 * 3600);
    // Blank departure falls back to the arrival time
    assert_eq!(&*a[1].trip_id, "T3");
    assert_eq!(&*a[1].departure_time, "09:00:00");

    let b = &index["B"];
    assert_eq!(b.len(), 2);
    assert_eq!(b[0].stop_sequence, 2);
    let overnight = &b[1];
    assert_eq!(&*overnight.departure_time, "25:10:00");
    assert_eq!(overnight.departure_secs, 25 * 3600 + 10 * 60);
}

#[test]
fn overflowing_times_are_skipped() {
    let dir = tempdir().unwrap();
    let stop_times = "trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T2,99999999:00:00,99999999:00:00,A,2
T1,08:02:00,08:02:00,B,2
";
    let path = write_feed(
        dir.path(),
        &[("stops.txt", STOPS), ("stop_times.txt", stop_times)],
    );
    let archive = FeedArchive::open(path).unwrap();
    let config = Config::default();
    let stops = parse_stops(&archive, &config).unwrap();
    let index = parse_departures(&archive, &config, &stops).unwrap();

    let a = &index["A"];
    assert_eq!(a.len(), 1);
    assert_eq!(&*a[0].trip_id, "T1");
    assert_eq!(index["B"][0].departure_secs, 8 * 3600 + 2 * 60);
}

#[test]
fn area_filter_drops_far_stops() {
    let dir = tempdir().unwrap();
    let path = write_feed(
        dir.path(),
        &[("stops.txt", STOPS), ("stop_times.txt", STOP_TIMES)],
    );
    let archive = FeedArchive::open(path).unwrap();
    let config =
        Config::default().with_area(Coordinate::new(59.33, 18.06), Distance::from_meters(100.0));
    let stops = parse_stops(&archive, &config).unwrap();
    assert_eq!(stops.len(), 1);
    let index = parse_departures(&archive, &config, &stops).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.contains_key("A"));
}

#[test]
fn full_extraction_writes_artifacts() {
    let dir = tempdir().unwrap();
    let path = write_feed(
        dir.path(),
        &[("stops.txt", STOPS), ("stop_times.txt", STOP_TIMES)],
    );
    let store = Store::new(dir.path().join("data"));
    let archive = FeedArchive::open(path).unwrap();
    let extraction = extract_archive(&archive, &Config::default(), &store).unwrap();
    assert!(matches!(
        extraction,
        Extraction::Complete {
            stops: 2,
            departures: 4
        }
    ));

    let repository = store.load().unwrap();
    assert_eq!(repository.stops.len(), 2);
    assert_eq!(repository.departure_count(), 4);
    assert_eq!(repository.calls_by_trip_id("T1").len(), 2);
}

#[test]
fn missing_stop_times_is_partial() {
    let dir = tempdir().unwrap();
    let path = write_feed(dir.path(), &[("stops.txt", STOPS)]);
    let store = Store::new(dir.path().join("data"));
    let archive = FeedArchive::open(path).unwrap();
    let extraction = extract_archive(&archive, &Config::default(), &store).unwrap();

    assert!(!extraction.is_complete());
    assert_eq!(extraction.stop_count(), 2);
    assert!(matches!(
        extraction,
        Extraction::Partial {
            error: feed::Error::MissingTable(_),
            ..
        }
    ));
    assert!(store.stops_path().exists());
    assert!(matches!(
        store.load(),
        Err(store::Error::DataUnavailable(_))
    ));
}

#[test]
fn extraction_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_feed(
        dir.path(),
        &[("stops.txt", STOPS), ("stop_times.txt", STOP_TIMES)],
    );
    let archive = FeedArchive::open(path).unwrap();
    let store = Store::new(dir.path().join("data"));

    extract_archive(&archive, &Config::default(), &store).unwrap();
    let stops = fs::read(store.stops_path()).unwrap();
    let departures = fs::read(store.departures_path()).unwrap();

    extract_archive(&archive, &Config::default(), &store).unwrap();
    assert_eq!(stops, fs::read(store.stops_path()).unwrap());
    assert_eq!(departures, fs::read(store.departures_path()).unwrap());
}

#[test]
fn empty_store_is_unavailable() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    assert!(matches!(
        store.load(),
        Err(store::Error::DataUnavailable(_))
    ));
    assert!(matches!(
        store.version(),
        Err(store::Error::DataUnavailable(_))
    ));
}

#[test]
fn version_changes_within_the_same_second() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let stop = |id: &str| Stop {
        id: id.into(),
        name: id.into(),
        coordinate: Coordinate::new(59.33, 18.06),
        ..Default::default()
    };
    store.write_stops(&[stop("A")]).unwrap();
    store.write_departures(&DepartureIndex::new()).unwrap();
    let before = store.version().unwrap();
    let modified = fs::metadata(store.stops_path()).unwrap().modified().unwrap();

    store.write_stops(&[stop("A"), stop("B")]).unwrap();
    // Pin the mtime back, as a coarse clock would report it
    fs::File::options()
        .write(true)
        .open(store.stops_path())
        .unwrap()
        .set_modified(modified)
        .unwrap();
    assert_ne!(before, store.version().unwrap());
}

#[test]
fn corrupt_archive_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feed.zip");
    fs::write(&path, b"not a zip").unwrap();
    assert!(matches!(FeedArchive::open(&path), Err(feed::Error::Zip(_))));
}
