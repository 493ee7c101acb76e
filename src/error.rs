//! Error types for the request-handling layer.
//!
//! The scheduling core never fails; these cover config, storage and
//! request validation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("task not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("missing or invalid x-owner-id header")]
    MissingOwner,

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::MissingOwner => StatusCode::UNAUTHORIZED,
            Error::Config(_) | Error::Io(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::BadRequest("title required".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::MissingOwner.into_response().status(), StatusCode::UNAUTHORIZED);
        let io = std::io::Error::other("disk full");
        assert_eq!(Error::from(io).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
