use std::{path::PathBuf, sync::Arc};

use stopwise::{
    feed::Extraction,
    repository::Repository,
    store::{Store, Version},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::AppError,
    refresh::{self, RefreshError},
};

struct Snapshot {
    version: Version,
    repository: Arc<Repository>,
}

pub struct AppState {
    pub config: Config,
    pub store: Store,
    snapshot: RwLock<Option<Snapshot>>,
    // Only one refresh writes the artifacts at a time
    refreshing: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Store::new(&config.data_dir);
        Self {
            config,
            store,
            snapshot: RwLock::new(None),
            refreshing: Mutex::new(()),
        }
    }

    /// The snapshot matching the artifacts currently on disk.
    ///
    /// Reloads when the artifacts were replaced since the last load, so a
    /// query never answers from a stale extraction.
    pub async fn repository(&self) -> Result<Arc<Repository>, AppError> {
        let version = self.store.version()?;
        if let Some(snapshot) = self.snapshot.read().await.as_ref()
            && snapshot.version == version
        {
            return Ok(snapshot.repository.clone());
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref()
            && snapshot.version == version
        {
            return Ok(snapshot.repository.clone());
        }

        let store = self.store.clone();
        let repository = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|err| AppError::internal(format!("Loading snapshot failed: {err}")))??;
        let repository = Arc::new(repository);
        info!(
            "Loaded snapshot with {} stops and {} trips",
            repository.stops.len(),
            repository.trip_count()
        );
        guard.replace(Snapshot {
            version,
            repository: repository.clone(),
        });
        Ok(repository)
    }

    /// Downloads and extracts the feed, then swaps in the new snapshot.
    pub async fn refresh(&self, url: Option<&str>) -> Result<Extraction, RefreshError> {
        let url = url
            .or(self.config.feed_url.as_deref())
            .ok_or(RefreshError::MissingUrl)?;
        let _guard = self.refreshing.lock().await;
        let extraction =
            refresh::download_and_extract(url, self.config.feed.clone(), self.store.clone())
                .await?;
        self.reload().await;
        Ok(extraction)
    }

    /// Extracts a local archive, then swaps in the new snapshot.
    pub async fn extract_local(&self, archive: PathBuf) -> Result<Extraction, RefreshError> {
        let _guard = self.refreshing.lock().await;
        let extraction =
            refresh::extract(archive, self.config.feed.clone(), self.store.clone()).await?;
        self.reload().await;
        Ok(extraction)
    }

    async fn reload(&self) {
        self.snapshot.write().await.take();
        if let Err(err) = self.repository().await {
            warn!("New snapshot is not queryable yet: {err:?}");
        }
    }
}
