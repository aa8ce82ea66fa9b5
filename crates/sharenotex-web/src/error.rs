use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sharenotex_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or rejected bearer token.
    Auth(String),
    /// Request could not be read (malformed JSON, bad query string).
    BadRequest { field: String, message: String },
    /// Field-level validation failures, keyed by field name.
    Validation(BTreeMap<String, String>),
    Core(CoreError),
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    field_name: String,
    message: String,
}

impl AppError {
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        CoreError::NotFound { .. } | CoreError::UserCreationFailed { .. } => StatusCode::NOT_FOUND,
        CoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        CoreError::IdentityProvider(_) => StatusCode::BAD_GATEWAY,
        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, field, message) = match self {
            AppError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response();
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "auth".to_string(), msg),
            AppError::BadRequest { field, message } => (StatusCode::BAD_REQUEST, field, message),
            AppError::Core(err) => {
                let status = core_status(&err);
                let field = err.field().to_string();
                match err {
                    CoreError::IdentityProvider(_) | CoreError::Store(_) => {
                        // Log the real error server-side, return generic message to client
                        tracing::error!("Upstream error: {}", err);
                        let message = if status == StatusCode::BAD_GATEWAY {
                            "Identity provider unavailable"
                        } else {
                            "Internal server error"
                        };
                        (status, field, message.to_string())
                    }
                    other => (status, field, other.to_string()),
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server".to_string(),
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            field_name: field,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        AppError::Core(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", e);
        AppError::Internal("Internal server error".to_string())
    }
}
