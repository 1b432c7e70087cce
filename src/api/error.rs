//! Error types for the HTTP API

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::errors::{DeckError, ExportError, SessionError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Session(_) => StatusCode::BAD_REQUEST,
            ApiError::Deck(DeckError::Session(_)) => StatusCode::BAD_REQUEST,
            ApiError::Deck(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Export(ExportError::NotImplemented(_)) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Export(ExportError::UnsupportedFormat(_))
            | ApiError::Export(ExportError::InvalidGeometry { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Export(ExportError::Package(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest("Invalid request data".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// `Json` extractor whose rejection is an [`ApiError`], so malformed bodies get the
/// same `{success:false, error}` shape as every other failure.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
