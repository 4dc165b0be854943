use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, time::Duration};
use stopwise::prelude::*;

const GRID: u32 = 40;
const SPACING: f64 = 0.004;

/// A grid of stops with one line per row and one per column, every ten minutes.
fn grid_repository() -> Repository {
    let origin = Coordinate::new(59.3, 18.0);
    let mut stops = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            stops.push(Stop {
                id: format!("{row}-{col}").into(),
                name: format!("Stop {row}-{col}").into(),
                coordinate: Coordinate::new(
                    origin.latitude + row as f64 * SPACING,
                    origin.longitude + col as f64 * SPACING * 2.0,
                ),
                ..Default::default()
            });
        }
    }

    let mut departures = DepartureIndex::new();
    let mut push = |trip: &str, stop: String, secs: u32, sequence: u32| {
        let stop_id: std::sync::Arc<str> = stop.into();
        departures.entry(stop_id.clone()).or_default().push(Departure {
            trip_id: trip.into(),
            stop_id,
            departure_time: Time::from_seconds(secs).to_hms_string().into(),
            departure_secs: secs,
            stop_sequence: sequence,
        });
    };
    for run in 0..36 {
        let start = 6 * 3600 + run * 600;
        for line in 0..GRID {
            let row_trip = format!("row-{line}-{run}");
            let col_trip = format!("col-{line}-{run}");
            for i in 0..GRID {
                push(&row_trip, format!("{line}-{i}"), start + i * 90, i + 1);
                push(&col_trip, format!("{i}-{line}"), start + 45 + i * 90, i + 1);
            }
        }
    }
    Repository::new().with_snapshot(stops, departures)
}

fn nearby(repository: &Repository) {
    let coordinate = Coordinate::new(59.37, 18.1);
    let _ = black_box(repository.stops_by_coordinate(
        &coordinate,
        Some(Distance::from_meters(500.0)),
        10,
    ));
}

fn short_solve(repository: &Repository) {
    let from = Coordinate::new(59.31, 18.02);
    let to = Coordinate::new(59.33, 18.06);
    let _ = black_box(
        repository
            .planner(from, to)
            .departure_at(Time::from_seconds(28800))
            .solve(),
    );
}

fn long_solve(repository: &Repository) {
    let from = Coordinate::new(59.30, 18.0);
    let to = Coordinate::new(59.45, 18.3);
    let _ = black_box(
        repository
            .planner(from, to)
            .departure_at(Time::from_seconds(28800))
            .solve(),
    );
}

fn criterion_benchmark(c: &mut Criterion) {
    let repository = grid_repository();

    let mut group = c.benchmark_group("Planning");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(15));

    group.bench_function("Nearby stops", |b| b.iter(|| nearby(&repository)));
    group.bench_function("Short route solve", |b| b.iter(|| short_solve(&repository)));
    group.bench_function("Long route solve", |b| b.iter(|| long_solve(&repository)));

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
