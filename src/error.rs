use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::assessment::ValidationErrors;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid profile: {0}")]
    Validation(#[from] ValidationErrors),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                let violations: Vec<serde_json::Value> = errors
                    .violations
                    .iter()
                    .map(|violation| {
                        json!({
                            "path": violation.path,
                            "message": violation.kind.to_string(),
                        })
                    })
                    .collect();
                let body = Json(json!({
                    "error": errors.to_string(),
                    "violations": violations,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
