use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider responded with {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("{context}: {message}")]
    Upstream { context: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChartServiceError>;

impl ChartServiceError {
    /// Wraps a provider-side failure with the user-facing headline for the
    /// operation that hit it.
    pub fn upstream(context: &str, err: ChartServiceError) -> Self {
        let message = match err {
            ChartServiceError::Upstream { message, .. } => message,
            other => other.to_string(),
        };
        ChartServiceError::Upstream {
            context: context.to_string(),
            message,
        }
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ChartServiceError::Validation(msg) | ChartServiceError::NotFound(msg) => msg.clone(),
            ChartServiceError::Upstream { context, .. } => context.clone(),
            other => other.to_string(),
        }
    }
}

impl From<QueryRejection> for ChartServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ChartServiceError::Validation(rejection.body_text())
    }
}

impl From<&ChartServiceError> for StatusCode {
    fn from(err: &ChartServiceError) -> Self {
        match err {
            ChartServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ChartServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ChartServiceError::Http(_)
            | ChartServiceError::Json(_)
            | ChartServiceError::Provider { .. }
            | ChartServiceError::Upstream { .. }
            | ChartServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChartServiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let body = match &self {
            ChartServiceError::Validation(msg) | ChartServiceError::NotFound(msg) => {
                json!({ "error": msg })
            }
            ChartServiceError::Upstream { context, message } => {
                json!({ "error": context, "message": message })
            }
            other => json!({ "error": "Internal server error", "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
