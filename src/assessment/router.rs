use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::domain::{FederalState, RiskReport};
use super::rules;
use crate::error::AppError;

/// Router builder exposing the assessment pipeline over HTTP.
pub fn assessment_router() -> Router {
    Router::new()
        .route("/api/v1/assessments", post(assess_handler))
        .route("/api/v1/rules/:federal_state", get(rules_handler))
}

/// Accepts an untyped profile payload; a validation failure never yields a
/// partial report, only the complete violation list (422 via [`AppError`]).
pub(crate) async fn assess_handler(
    Json(payload): Json<Value>,
) -> Result<Json<RiskReport>, AppError> {
    let report = super::assess(payload)?;
    Ok(Json(report))
}

pub(crate) async fn rules_handler(Path(federal_state): Path<String>) -> Response {
    let state: FederalState =
        match serde_json::from_value(Value::String(federal_state.clone())) {
            Ok(state) => state,
            Err(_) => {
                let payload = json!({
                    "error": format!("unknown federal state '{federal_state}'"),
                });
                return (StatusCode::NOT_FOUND, Json(payload)).into_response();
            }
        };

    match rules::builtin(state) {
        Some(builtin) => {
            let payload = json!({
                "federal_state": state,
                "version": builtin.version,
                "rules": builtin.config,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        None => {
            let payload = json!({
                "error": "custom jurisdictions define their own rules in the profile",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}
