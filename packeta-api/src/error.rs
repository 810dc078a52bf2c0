use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request input
    BadRequest(String),
    /// A core operation failed; the message is shown to the caller
    Upstream {
        context: &'static str,
        message: String,
    },
    /// Something failed without a usable message
    Unknown,
}

impl AppError {
    pub fn upstream(context: &'static str, error: impl fmt::Display) -> Self {
        Self::Upstream {
            context,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream { context, message } => {
                let message = format!("{}: {}", context, message);
                tracing::error!("{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::Unknown => {
                tracing::error!("Request failed without an error message");
                let message = "An unknown error occurred".to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
