// =========================
// tests/unit/error_tests.rs
// =========================
//! Unit tests for the error module
use axum::http::StatusCode;
use axum::response::IntoResponse;
use backend_lib::auth::TokenError;
use backend_lib::directory::DirectoryError;
use backend_lib::error::AppError;
use std::time::Duration;

#[test]
fn test_app_error_display() {
    let auth_error = AppError::Unauthenticated("missing or malformed token".to_string());
    assert_eq!(
        auth_error.to_string(),
        "Unauthenticated: missing or malformed token"
    );
    assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid credentials");
    assert_eq!(AppError::Conflict.to_string(), "Email already registered");
}

#[test]
fn test_error_codes_are_stable() {
    let cases = [
        (AppError::InvalidInput("x".to_string()), "VAL_002", StatusCode::BAD_REQUEST),
        (AppError::Unauthenticated("x".to_string()), "AUTH_001", StatusCode::UNAUTHORIZED),
        (AppError::InvalidCredentials, "AUTH_002", StatusCode::UNAUTHORIZED),
        (AppError::Conflict, "ACC_001", StatusCode::CONFLICT),
        (AppError::NotFound, "NF_001", StatusCode::NOT_FOUND),
        (AppError::Hashing("x".to_string()), "HASH_001", StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::Serialization("x".to_string()), "SER_001", StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::Internal("x".to_string()), "INT_001", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (error, code, status) in cases {
        assert_eq!(error.error_code(), code);
        assert_eq!(error.status_code(), status);
    }
}

#[test]
fn test_sanitized_messages_hide_details() {
    let error = AppError::Internal("db password is hunter2".to_string());
    assert!(!error.sanitized_message().contains("hunter2"));

    let error = AppError::from(DirectoryError::Timeout(Duration::from_millis(5)));
    assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.sanitized_message(), "An internal server error occurred");
}

#[test]
fn test_expired_token_maps_to_unauthenticated() {
    let error = AppError::from(TokenError::Expired);
    assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
}
