use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use resolver::error::{ContactError, UnknownKind};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    InvalidContact(#[from] ContactError),

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("Missing or invalid admin token")]
    Unauthorized,

    #[error("Cache invalidation is disabled")]
    Forbidden,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UnknownKind(_) => StatusCode::NOT_FOUND,
            AppError::InvalidContact(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
