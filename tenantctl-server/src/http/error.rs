//! API error types with IntoResponse.
//!
//! Collaborator errors surface as HTTP 500 with their message string; missing
//! or malformed request fields map to 400. No retry or backoff anywhere.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::manager::ConnectionError;
use crate::db::migrate::MigrationError;
use crate::db::provision::ProvisionError;
use crate::db::repos::DbError;

/// API error type with automatic HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Required body field missing or malformed (400).
    Validation { message: String },

    /// Connection open/initialize failure (500).
    Connection(ConnectionError),

    /// Schema apply failure (500).
    Migration(MigrationError),

    /// Constraint violation, e.g. duplicate email (500).
    Constraint { message: String },

    /// Anything else, message captured as a string (500).
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Connection(err) => {
                tracing::error!("connection error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Migration(err) => {
                tracing::error!("migration error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Constraint { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            Self::Internal { message } => {
                tracing::error!("internal error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        Self::Connection(err)
    }
}

impl From<MigrationError> for ApiError {
    fn from(err: MigrationError) -> Self {
        Self::Migration(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { .. } => Self::Constraint {
                message: err.to_string(),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Connection(err) => err.into(),
            ProvisionError::Db(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_is_400() {
        let response = ApiError::validation("provider and url are required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn constraint_error_is_500() {
        let err: ApiError = DbError::UniqueViolation {
            column: "email",
            value: "ada@acme.test".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn migration_error_is_500() {
        let err: ApiError = MigrationError::Apply(sqlx::Error::PoolClosed).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
