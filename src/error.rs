//! Handler-boundary error type. Every downstream failure is converted here
//! into the fixed `{error, details}` JSON shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Unparseable or missing input from the caller.
    BadRequest(String),
    /// The collaborator has no record of the requested item.
    NotFound(String),
    /// A required outbound call failed; carries an opaque diagnostic.
    Downstream { error: String, details: String },
}

impl ApiError {
    pub fn downstream(error: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ApiError::Downstream {
            error: error.into(),
            details: source.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Downstream { error, details } => {
                eprintln!("[api] {}: {}", error, details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error, "details": details })),
                )
                    .into_response()
            }
        }
    }
}
