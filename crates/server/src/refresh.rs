//! Downloading a feed archive and turning it into fresh artifacts.

use futures_util::StreamExt;
use reqwest::{StatusCode, header::ACCEPT_ENCODING};
use std::{
    io,
    path::{Path, PathBuf},
    time::Instant,
};
use stopwise::{
    feed::{self, Extraction, FeedArchive},
    store::Store,
};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Download failed with status {0}")]
    Status(StatusCode),
    #[error("No feed url configured")]
    MissingUrl,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Extraction failed: {0}")]
    Feed(#[from] feed::Error),
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Streams `url` into `destination`.
///
/// The body goes to a sibling `.part` file that is renamed over the
/// destination once complete. Failed downloads are not retried.
pub async fn download(url: &str, destination: &Path) -> Result<u64, RefreshError> {
    info!("Downloading feed from {url}");
    let now = Instant::now();
    let response = reqwest::Client::new()
        .get(url)
        .header(ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RefreshError::Status(response.status()));
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    let part_path = part_path(destination);
    let mut file = fs::File::create(&part_path).await?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let data = chunk?;
        file.write_all(&data).await?;
        written += data.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&part_path, destination).await?;
    debug!("Downloading {written} bytes took {:?}", now.elapsed());
    Ok(written)
}

/// Extracts an archive already on disk, off the async runtime.
pub async fn extract(
    archive_path: PathBuf,
    config: feed::Config,
    store: Store,
) -> Result<Extraction, RefreshError> {
    let extraction = tokio::task::spawn_blocking(move || {
        let archive = FeedArchive::open(archive_path)?;
        feed::extract_archive(&archive, &config, &store)
    })
    .await??;
    Ok(extraction)
}

/// Downloads the feed into the store's archive slot and extracts it.
///
/// Departure extraction is best effort: a failure there still returns
/// `Ok(Extraction::Partial)` with the fresh stop catalog in place.
pub async fn download_and_extract(
    url: &str,
    config: feed::Config,
    store: Store,
) -> Result<Extraction, RefreshError> {
    let archive_path = store.archive_path();
    download(url, &archive_path).await?;
    extract(archive_path, config, store).await
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_file_sits_next_to_destination() {
        let path = part_path(Path::new("/data/feed.zip"));
        assert_eq!(path, PathBuf::from("/data/feed.zip.part"));
    }

    #[tokio::test]
    async fn missing_archive_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let result = extract(
            dir.path().join("missing.zip"),
            feed::Config::default(),
            store,
        )
        .await;
        assert!(matches!(result, Err(RefreshError::Feed(feed::Error::Io(_)))));
    }
}
