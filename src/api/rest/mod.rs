//! REST API module for HTTP endpoints
//!
//! - `GET /api/queue/display` - Display snapshot of every polyclinic
//! - `GET /api/queue/display/:polyclinic_id` - Display item of one polyclinic
//! - `GET|POST /api/polyclinics` - Reference data
//! - `POST /api/queue/...` - Queue mutations (take, call, serve, complete, reset)

pub mod display;
pub mod polyclinics;
pub mod tickets;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.to_string(),
        }
    }
}

impl QueueError {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            QueueError::PolyclinicNotFound(_) | QueueError::TicketNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            QueueError::DuplicatePolyclinic(_)
            | QueueError::NothingWaiting(_)
            | QueueError::InvalidTransition { .. }
            | QueueError::AlreadyServing { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            QueueError::InvalidTopic(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            QueueError::IntegrityViolation { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATA_INTEGRITY")
            }
            QueueError::Config(_) | QueueError::Io(_) | QueueError::Json(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }
        (status, Json(ApiError::new(code, self.to_string()))).into_response()
    }
}
