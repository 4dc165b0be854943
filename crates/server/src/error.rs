use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use stopwise::store;
use tracing::{error, warn};

use crate::refresh::RefreshError;

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Timeout,
    Internal { message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}

impl From<store::Error> for AppError {
    fn from(e: store::Error) -> Self {
        match e {
            store::Error::DataUnavailable(_) => AppError::NotFound {
                message: "No timetable has been extracted yet, trigger a refresh with POST /refresh"
                    .to_string(),
            },
            _ => AppError::internal(e.to_string()),
        }
    }
}

impl From<RefreshError> for AppError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::MissingUrl => AppError::bad_request(e.to_string()),
            RefreshError::Download(_) | RefreshError::Status(_) => AppError::BadGateway {
                message: e.to_string(),
            },
            _ => AppError::internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Request timed out".to_string(),
            ),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!("[{status}] {message}");
        } else {
            warn!("[{status}] {message}");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
