use std::{error::Error, fmt::Display};

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum AppError {
    ReqwestError(String),
    StatusError(u16),
    MalformedBody(String),
    UpstreamError(String),
    ConfigError(String),
    SessionNotFound(uuid::Uuid),
    Custom(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ReqwestError(e) => write!(f, "{e}"),
            AppError::StatusError(code) => write!(f, "upstream responded with status {code}"),
            AppError::MalformedBody(e) => write!(f, "malformed response: {e}"),
            AppError::UpstreamError(kind) => write!(f, "upstream reported an error: {kind}"),
            AppError::ConfigError(e) => write!(f, "configuration error: {e}"),
            AppError::SessionNotFound(id) => write!(f, "session {id} not found"),
            AppError::Custom(e) => write!(f, "{e}"),
        }
    }
}
impl Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::MalformedBody(value.to_string())
        } else {
            Self::ReqwestError(value.to_string())
        }
    }
}
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedBody(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ReqwestError(_)
            | AppError::StatusError(_)
            | AppError::MalformedBody(_)
            | AppError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) | AppError::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_user_facing() {
        assert_eq!(
            AppError::StatusError(503).to_string(),
            "upstream responded with status 503"
        );
        assert_eq!(
            AppError::UpstreamError("unsupported-code".into()).to_string(),
            "upstream reported an error: unsupported-code"
        );
    }

    #[test]
    fn test_status_mapping() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            AppError::SessionNotFound(id).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::StatusError(500).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
