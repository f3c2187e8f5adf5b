// =========================
// tests/unit/middleware_tests.rs
// =========================
//! Unit tests for the access gate
use crate::test_utils::{body_json, state_at, test_clock};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use backend_lib::middleware::{require_auth, AuthenticatedUser};
use chrono::Duration;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tempfile::TempDir;
use tower::ServiceExt;
use userbase_common::AccountId;

struct Gate {
    app: Router,
    hits: Arc<AtomicUsize>,
    token: String,
    account_id: AccountId,
    clock: backend_lib::clock::ManualClock,
    _dir: TempDir,
}

fn gate() -> Gate {
    let dir = TempDir::new().unwrap();
    let clock = test_clock();
    let state = state_at(dir.path(), &clock);
    let account_id = AccountId::new();
    let token = state.tokens.issue(account_id, "a@x.com").unwrap().token;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new()
        .route(
            "/guarded",
            get(move |user: AuthenticatedUser| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    user.account_id.to_string()
                }
            }),
        )
        .route_layer(from_fn_with_state(state, require_auth));

    Gate {
        app,
        hits,
        token,
        account_id,
        clock,
        _dir: dir,
    }
}

fn request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/guarded");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_valid_token_reaches_handler_once() {
    let gate = gate();
    let response = gate
        .app
        .clone()
        .oneshot(request(Some(&format!("Bearer {}", gate.token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes, gate.account_id.to_string().as_bytes());
    assert_eq!(gate.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let gate = gate();
    let response = gate.app.clone().oneshot(request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTH_001");
    assert_eq!(gate.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_bearer_prefix_is_unauthorized() {
    let gate = gate();
    for value in [gate.token.clone(), format!("Token {}", gate.token), "Bearer".to_string()] {
        let response = gate.app.clone().oneshot(request(Some(&value))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(gate.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let gate = gate();
    gate.clock.advance(Duration::hours(2));

    let response = gate
        .app
        .clone()
        .oneshot(request(Some(&format!("Bearer {}", gate.token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(gate.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_tampered_token_is_unauthorized() {
    let gate = gate();
    let mut chars: Vec<char> = gate.token.chars().collect();
    let i = chars.len() - 5;
    chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let response = gate
        .app
        .clone()
        .oneshot(request(Some(&format!("Bearer {tampered}"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(gate.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_extractor_without_gate_is_unauthorized() {
    let app = Router::new().route(
        "/guarded",
        get(|user: AuthenticatedUser| async move { user.email }),
    );
    let response = app.oneshot(request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
