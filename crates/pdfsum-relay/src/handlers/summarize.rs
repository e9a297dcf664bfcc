use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pdfsum_core::summary::relay::{SummarizeRequest, SummarizeResponse};

use crate::state::AppState;

pub const TEXT_REQUIRED: &str = "Text is required";
pub const SUMMARY_FAILED: &str = "Failed to generate summary";
pub const TEXT_TOO_LARGE: &str = "Text is too large";

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    req: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let req = match req {
        Ok(Json(req)) => req,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return error(StatusCode::PAYLOAD_TOO_LARGE, TEXT_TOO_LARGE);
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected summarize body");
            return error(StatusCode::BAD_REQUEST, TEXT_REQUIRED);
        }
    };

    if req.text.is_empty() {
        return error(StatusCode::BAD_REQUEST, TEXT_REQUIRED);
    }

    tracing::info!(chars = req.text.chars().count(), "summarize request");

    match state.summarizer.summarize(&req.text).await {
        Ok(summary) => Json(SummarizeResponse { summary }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, summarizer = state.summarizer.name(), "summarization failed");
            error(StatusCode::BAD_GATEWAY, SUMMARY_FAILED)
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
