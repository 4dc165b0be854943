use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Instant,
};
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

mod config;
mod extract;
pub mod fields;
pub mod models;

pub use config::*;
pub use extract::*;

use crate::store;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Archive does not contain table {0}")]
    MissingTable(String),
    #[error("Failed to write artifact: {0}")]
    Store(#[from] store::Error),
}

/// Counters reported after a table has been streamed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub rows: usize,
    pub skipped: usize,
}

/// A compressed GTFS archive on disk.
///
/// Tables are streamed straight out of the zip entry, nothing is
/// decompressed up front.
#[derive(Debug, Clone)]
pub struct FeedArchive {
    path: PathBuf,
}

impl FeedArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let path = path.as_ref().to_path_buf();
        // Fail early on a corrupt download instead of on the first table.
        ZipArchive::new(File::open(&path)?)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Streams every well formed row of `file_name` into `f`.
    /// Rows that fail to deserialize are counted and skipped.
    pub fn stream_table<T, F>(&self, file_name: &str, mut f: F) -> Result<TableStats, self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        let now = Instant::now();
        let mut archive = ZipArchive::new(File::open(&self.path)?)?;
        let entry_name = locate_entry(&archive, file_name)
            .ok_or_else(|| self::Error::MissingTable(file_name.to_string()))?;
        let entry = archive.by_name(&entry_name)?;

        let mut reader = fields::reader_builder().from_reader(entry);
        let headers = reader.headers()?.clone();
        let mut stats = TableStats::default();
        let mut record = csv::StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => match record.deserialize::<T>(Some(&headers)) {
                    Ok(row) => {
                        f((stats.rows, row));
                        stats.rows += 1;
                    }
                    Err(err) => {
                        debug!("Skipping malformed row in {entry_name}: {err}");
                        stats.skipped += 1;
                    }
                },
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    debug!("Skipping unreadable row in {entry_name}: {err}");
                    stats.skipped += 1;
                }
            }
        }

        if stats.skipped > 0 {
            warn!("Skipped {} malformed rows in {entry_name}", stats.skipped);
        }
        debug!(
            "Streaming {entry_name} ({} rows) took {:?}",
            stats.rows,
            now.elapsed()
        );
        Ok(stats)
    }
}

/// Finds the archive entry whose base name is `file_name`.
/// Feeds are sometimes zipped with a top level folder, so nested entries
/// are accepted. The shallowest match wins.
fn locate_entry(archive: &ZipArchive<File>, file_name: &str) -> Option<String> {
    archive
        .file_names()
        .filter(|name| !name.starts_with("__MACOSX"))
        .filter(|name| {
            Path::new(name)
                .file_name()
                .is_some_and(|base| base == file_name)
        })
        .min_by_key(|name| name.matches('/').count())
        .map(str::to_string)
}
