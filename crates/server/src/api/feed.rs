use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use stopwise::feed::Extraction;
use tracing::{info, warn};

use crate::{error::AppError, state::AppState};

/// Seconds since the feed archive was last written.
pub async fn age(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let path = state.store.archive_path();
    if !path.exists() {
        return Err(AppError::NotFound {
            message: "No feed archive has been downloaded yet".to_string(),
        });
    }
    let last_modified = seconds_since_modified(&path)?;
    Ok(last_modified.to_string().into_response())
}

fn seconds_since_modified<P: AsRef<Path>>(path: P) -> Result<u64, AppError> {
    let meta_data = fs::metadata(path)
        .map_err(|err| AppError::internal(format!("Failed to get metadata: {err}")))?;
    let modified = meta_data
        .modified()
        .map_err(|err| AppError::internal(format!("Failed to get modified: {err}")))?;
    // A clock stepping backwards makes the file look fresh
    let duration = modified.elapsed().unwrap_or_default();
    Ok(duration.as_secs())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub complete: bool,
    pub stops: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departures_error: Option<String>,
}

impl RefreshResponse {
    pub fn from(extraction: &Extraction) -> Self {
        let departures_error = match extraction {
            Extraction::Complete { .. } => None,
            Extraction::Partial { error, .. } => Some(error.to_string()),
        };
        Self {
            complete: extraction.is_complete(),
            stops: extraction.stop_count(),
            departures_error,
        }
    }
}

/// Downloads the feed and regenerates the artifacts.
///
/// Uses the `url` parameter when given, else the configured feed url.
pub async fn refresh(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, AppError> {
    let url = params.get("url").map(|url| url.as_str());
    let extraction = state.refresh(url).await?;
    match &extraction {
        Extraction::Complete { .. } => info!("Refresh complete"),
        Extraction::Partial { error, .. } => warn!("Refresh only updated stops: {error}"),
    }
    Ok(Json(RefreshResponse::from(&extraction)))
}
