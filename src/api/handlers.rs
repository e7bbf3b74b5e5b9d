//! HTTP API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::scraping::pipeline::{PipelineError, ScrapePipeline};

use super::types::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScrapePipeline>,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Scrape endpoint
pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let url = match requested_url(payload) {
        Ok(url) => url,
        Err(message) => {
            debug!("Rejected scrape request: {}", message);
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(message)))
                .into_response();
        }
    };

    match state.pipeline.scrape(&url).await {
        Ok(result) => (StatusCode::OK, Json(ScrapeResponse { result })).into_response(),
        Err(PipelineError::InvalidUrl(message)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(message))).into_response()
        }
        Err(e) => {
            error!("Scrape of {} failed: {}", url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Pull a usable `url` out of the request body, or the 400 message.
fn requested_url(payload: Result<Json<Value>, JsonRejection>) -> Result<String, String> {
    let Json(body) = payload.map_err(|_| "url is required".to_string())?;

    let url = match body.get("url") {
        Some(Value::String(url)) if !url.is_empty() => url.clone(),
        _ => return Err("url is required".to_string()),
    };

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("url must start with http:// or https://".to_string());
    }
    Ok(url)
}
