//! Flat artifact files written by the extractor and read by the query path.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::{Instant, SystemTime},
};
use thiserror::Error;
use tracing::debug;

use crate::repository::{DepartureIndex, Repository, Stop};

pub const STOPS_FILE_NAME: &str = "stops.json";
pub const DEPARTURES_FILE_NAME: &str = "departures.json";
pub const ARCHIVE_FILE_NAME: &str = "feed.zip";

#[derive(Error, Debug)]
pub enum Error {
    #[error("No extracted timetable at {0}, trigger a feed refresh first")]
    DataUnavailable(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Identifies one state of the artifacts on disk.
///
/// Compares modification time and length of both files, so a rewrite within
/// the mtime granularity of the filesystem is still noticed unless it
/// produced a file of the exact same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    stops: Stamp,
    departures: Stamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

/// The data directory holding the raw archive and both artifacts.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE_NAME)
    }

    pub fn stops_path(&self) -> PathBuf {
        self.dir.join(STOPS_FILE_NAME)
    }

    pub fn departures_path(&self) -> PathBuf {
        self.dir.join(DEPARTURES_FILE_NAME)
    }

    pub fn write_stops(&self, stops: &[Stop]) -> Result<(), self::Error> {
        write_atomic(&self.stops_path(), stops)
    }

    pub fn write_departures(&self, departures: &DepartureIndex) -> Result<(), self::Error> {
        write_atomic(&self.departures_path(), departures)
    }

    pub fn read_stops(&self) -> Result<Vec<Stop>, self::Error> {
        read_json(&self.stops_path())
    }

    pub fn read_departures(&self) -> Result<DepartureIndex, self::Error> {
        read_json(&self.departures_path())
    }

    /// Changes whenever either artifact is replaced.
    pub fn version(&self) -> Result<Version, self::Error> {
        Ok(Version {
            stops: stamp(&self.stops_path())?,
            departures: stamp(&self.departures_path())?,
        })
    }

    /// Reads both artifacts and builds a [`Repository`] from them.
    pub fn load(&self) -> Result<Repository, self::Error> {
        debug!("Loading snapshot from {}", self.dir.display());
        let now = Instant::now();
        let stops = self.read_stops()?;
        let departures = self.read_departures()?;
        let repository = Repository::new().with_snapshot(stops, departures);
        debug!("Loading snapshot took {:?}", now.elapsed());
        Ok(repository)
    }
}

fn stamp(path: &Path) -> Result<Stamp, self::Error> {
    match fs::metadata(path) {
        Ok(meta_data) => Ok(Stamp {
            modified: meta_data.modified()?,
            len: meta_data.len(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(self::Error::DataUnavailable(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, self::Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(self::Error::DataUnavailable(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes next to the target and renames over it, so a reader sees either
/// the old file or the new one.
fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), self::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
