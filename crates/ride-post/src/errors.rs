use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Route fetch failed: {0}")]
    RouteFetch(String),

    #[error("GPX parsing error: {0}")]
    GpxParsing(String),

    #[error("Track has no points")]
    EmptyTrack,

    #[error("Meeting point registry is empty")]
    EmptyRegistry,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failures of the sunset lookup. These never leave the sunset resolver,
/// which replaces them with the fallback time.
#[derive(Error, Debug)]
pub enum SunsetError {
    #[error("Sunset request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sunset service returned status {0}")]
    Status(u16),

    #[error("Malformed sunset payload: {0}")]
    MalformedPayload(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RouteFetch(msg) => {
                error!("Route fetch error: {msg}");
                StatusCode::BAD_GATEWAY
            }
            AppError::GpxParsing(msg) => {
                error!("GPX parsing error: {msg}");
                StatusCode::BAD_GATEWAY
            }
            AppError::EmptyTrack => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptyRegistry => {
                error!("No meeting points configured");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
