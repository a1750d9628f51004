use super::request::parse_request;
use super::AppState;
use crate::error::{AnalyzeError, PersistenceError, ValidationError};
use crate::history::HistoryEntry;
use crate::language::Mode;
use crate::report::to_legacy_explanation;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, warn};

/// Provider details relayed to callers are cut to this many characters
const MAX_ERROR_DETAILS_CHARS: usize = 500;

pub enum ApiError {
    Validation(ValidationError),
    Analyze(AnalyzeError),
    History(PersistenceError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(e: AnalyzeError) -> Self {
        ApiError::Analyze(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
            }
            ApiError::Analyze(AnalyzeError::Provider(e)) => match e.status() {
                Some(status) => {
                    let details: String = e
                        .provider_message()
                        .chars()
                        .take(MAX_ERROR_DETAILS_CHARS)
                        .collect();
                    error!("AI provider error: {} {}", status, details);
                    (
                        StatusCode::BAD_GATEWAY,
                        Json(json!({ "error": "AI provider error", "details": details })),
                    )
                        .into_response()
                }
                None => {
                    error!("Analysis failed: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to process" })),
                    )
                        .into_response()
                }
            },
            ApiError::History(e) => {
                warn!("Failed to fetch history: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch history" })),
                )
                    .into_response()
            }
        }
    }
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection);
            Err(ValidationError::InvalidPayload.into())
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_request(&body(payload)?, state.analyzer.config().max_code_chars)?;
    let outcome = state.analyzer.analyze(request).await?;
    Ok(Json(json!({ "report": outcome.report, "model": outcome.model })))
}

/// Older response shape: the corrected code and a flattened explanation
/// alongside the structured report.
pub async fn fix(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_request(&body(payload)?, state.analyzer.config().max_code_chars)?;
    let outcome = state.analyzer.analyze(request).await?;
    Ok(Json(json!({
        "fixedCode": outcome.report.corrected_code,
        "explanation": to_legacy_explanation(&outcome.report),
        "report": outcome.report,
        "model": outcome.model,
    })))
}

pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let limit = state.analyzer.config().history.recent_limit;
    let entries = state
        .analyzer
        .history()
        .recent(limit)
        .await
        .map_err(ApiError::History)?;
    Ok(Json(entries))
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "project": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.analyzer.config().preferred_model(Mode::default()),
        "persistence": state.analyzer.history().backend().to_string(),
        "time": Utc::now().to_rfc3339(),
    }))
}
