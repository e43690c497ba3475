//! Maps pipeline failures to HTTP responses.

use axum::http::header::CACHE_CONTROL;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::pipeline::PipelineError;

pub const FETCH_FAILED_MESSAGE: &str =
    "Error fetching weather alerts - service temporarily unavailable";
pub const PARSE_FAILED_MESSAGE: &str = "Error parsing weather alerts";

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PipelineError::Fetch(err) => {
                tracing::error!(error = %err, "Alert feed unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, FETCH_FAILED_MESSAGE)
            }
            PipelineError::Parse(err) => {
                tracing::error!(error = %err, "Alert feed could not be parsed");
                (StatusCode::INTERNAL_SERVER_ERROR, PARSE_FAILED_MESSAGE)
            }
        };

        (status, [(CACHE_CONTROL, "no-cache")], message).into_response()
    }
}
