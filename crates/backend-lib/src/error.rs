// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::auth::{HashError, TokenError};
use crate::directory::DirectoryError;
use crate::validation::ValidationErrors;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    Conflict,

    #[error("Account not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(DirectoryError),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            },
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_)
            | AppError::Hashing(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::InvalidInput(_) => "VAL_002",
            AppError::Unauthenticated(_) => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::Conflict => "ACC_001",
            AppError::NotFound => "NF_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Hashing(_) => "HASH_001",
            AppError::Serialization(_) => "SER_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Request validation failed".to_string(),
            AppError::InvalidInput(_) => "Invalid request format".to_string(),
            AppError::Unauthenticated(_) => "Missing, invalid or expired token".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::Conflict => "Email already registered".to_string(),
            AppError::NotFound => "Resource not found".to_string(),
            AppError::Storage(_)
            | AppError::Hashing(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    /// Whether this error originates inside the service rather than the request
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound => AppError::NotFound,
            DirectoryError::DuplicateEmail => AppError::Conflict,
            DirectoryError::Serialization(e) => AppError::Serialization(e.to_string()),
            other => AppError::Storage(other),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => {
                AppError::Unauthenticated(err.to_string())
            },
            TokenError::Signing(_) | TokenError::WeakSecret | TokenError::InvalidTtl => {
                AppError::Internal(err.to_string())
            },
        }
    }
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        AppError::Hashing(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_internal() {
            tracing::error!(code = error_code, error = %self, "request failed");
        } else {
            tracing::debug!(code = error_code, error = %self, "request rejected");
        }

        // Internal details never leave the process
        let message = if self.is_internal() {
            self.sanitized_message()
        } else if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let mut error = serde_json::json!({
            "code": error_code,
            "message": message,
        });
        if let AppError::Validation(fields) = &self {
            error["fields"] = serde_json::json!(fields);
        }

        (status, axum::Json(serde_json::json!({ "error": error }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
