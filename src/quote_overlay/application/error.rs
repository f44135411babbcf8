use thiserror::Error;
use crate::domain::error::DomainError; // ドメインエラーをラップするため
use crate::infrastructure::error::InfrastructureError; // InfrastructureError をラップするため

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Overlay rendering failed: {0}")]
    RenderFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    DomainError(#[from] DomainError),

    #[error("{0}")]
    InfrastructureError(#[from] InfrastructureError),
}

// IntoResponse implementation for ApplicationError
use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

impl ApplicationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::BadRequest(_) | ApplicationError::DomainError(_) => StatusCode::BAD_REQUEST,
            ApplicationError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApplicationError::RenderFailed(_) | ApplicationError::ConfigurationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApplicationError::InfrastructureError(infra_err) => match infra_err {
                InfrastructureError::DomainErrorWrapper(_)
                | InfrastructureError::DecodingError(_)
                | InfrastructureError::Base64DecodeError(_) => StatusCode::BAD_REQUEST,
                InfrastructureError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
                InfrastructureError::EncodeError(_)
                | InfrastructureError::FontLoadError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
