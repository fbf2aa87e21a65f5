//! Research request errors and their HTTP mapping.
//!
//! 400 for caller faults, 502 when the model answered with something that is
//! not a research result, 500 for everything else.

use crate::normalizer::MissingInputError;
use crate::recovery::UpstreamFormatError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campaign_common::CompletionError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// Body was not a JSON object of the expected shape
    #[error("Invalid request body: {0}")]
    InvalidInput(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    MissingInput(#[from] MissingInputError),

    #[error("completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    UpstreamFormat(#[from] UpstreamFormatError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResearchError::InvalidInput(_) | ResearchError::MissingInput(_) => {
                StatusCode::BAD_REQUEST
            }
            ResearchError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ResearchError::UpstreamFormat(_) => StatusCode::BAD_GATEWAY,
            ResearchError::Completion(_) | ResearchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-side fault, never reaches the completion service
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for ResearchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ResearchError::InvalidInput(_)
            | ResearchError::PayloadTooLarge(_)
            | ResearchError::MissingInput(_) => json!({ "error": self.to_string() }),
            ResearchError::UpstreamFormat(e) => json!({
                "error": "Model returned invalid JSON",
                "raw": e.raw,
                "details": e.reason,
            }),
            ResearchError::Completion(e) => json!({
                "error": "Internal server error",
                "message": e.to_string(),
            }),
            // Detail stays in the server log
            ResearchError::Internal(_) => json!({
                "error": "Internal server error",
                "message": "Unexpected failure while processing the research request",
            }),
        };

        (status, Json(body)).into_response()
    }
}
