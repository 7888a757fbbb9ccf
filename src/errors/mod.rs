use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::qr::composer::QrError;
use crate::qr::sink::SinkError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Storage Error: {0}")]
    StorageError(String),
    #[error("AWS Error: {0}")]
    AWSError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::StorageError(msg)
            | AppError::AWSError(msg) => msg,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::StorageError(_)
            | AppError::AWSError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.message().to_string(),
        })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => AppError::Conflict(format!(
                "Employee ID '{}' already exists. Please use a unique ID.",
                id
            )),
            StoreError::NotFound(id) => AppError::NotFound(format!("Employee '{}' not found", id)),
            StoreError::UsernameTaken(name) => {
                AppError::Conflict(format!("Username '{}' already exists", name))
            }
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        match err {
            QrError::EmptyPayload => AppError::BadRequest(QrError::EmptyPayload.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<SinkError> for AppError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Upload(msg) => AppError::AWSError(msg),
            other => AppError::StorageError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_conflict_with_readable_message() {
        let err = AppError::from(StoreError::Duplicate("E1".to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.message(),
            "Employee ID 'E1' already exists. Please use a unique ID."
        );
    }

    #[test]
    fn upload_failures_are_server_errors() {
        let err = AppError::from(SinkError::Upload("bucket gone".to_string()));
        assert!(matches!(err, AppError::AWSError(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_payload_is_a_bad_request() {
        let err = AppError::from(QrError::EmptyPayload);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
