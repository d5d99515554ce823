use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::metrics::API_ERRORS_COUNTER;

/// Errors surfaced at the request boundary. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client input was malformed; never retried.
    #[error("{0}")]
    BadRequest(String),
    /// Store or query failure. Any open transaction has already been dropped.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                API_ERRORS_COUNTER.with_label_values(&["bad_request"]).inc();
            }
            ApiError::Store(e) => {
                tracing::error!("Store failure: {:#}", e);
                API_ERRORS_COUNTER.with_label_values(&["store"]).inc();
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
