//! End-to-end registration and login over the flat-file directory
use crate::test_utils::{
    get_request, json_request, login, register, registration, send, setup_test_app, state_at,
    test_clock, PASSWORD,
};
use axum::http::{Method, StatusCode};
use backend_lib::routes;
use chrono::Duration;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_register_login_get_profile() {
    let (app, _clock, _dir) = setup_test_app();

    let user_id = register(&app, "a@x.com").await;
    let token = login(&app, "a@x.com").await;

    let (status, body) = send(&app, get_request("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "profile fetched successfully");
    assert_eq!(body["data"]["user_id"], user_id.as_str());
    assert_eq!(body["data"]["first_name"], "Ada");
    assert_eq!(body["data"]["gender"], "female");
    assert_eq!(body["data"]["dob"], "1990-12-10");
    assert_eq!(body["data"]["age"], 33);
}

#[tokio::test]
async fn test_register_response_envelope() {
    let (app, _clock, _dir) = setup_test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/register",
            &registration("a@x.com"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "success");
    assert!(body["data"]["user_id"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let (app, _clock, _dir) = setup_test_app();
    register(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/register",
            &registration("A@x.COM"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ACC_001");

    // The original account still logs in
    login(&app, "a@x.com").await;
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_creates_one_account() {
    let (app, _clock, _dir) = setup_test_app();

    let attempts = (0..8).map(|_| {
        let app = app.clone();
        tokio::spawn(async move {
            send(
                &app,
                json_request(
                    Method::POST,
                    "/api/v1/users/register",
                    &registration("race@x.com"),
                    None,
                ),
            )
            .await
            .0
        })
    });

    let mut created = 0;
    let mut conflicts = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        match attempt.await.unwrap() {
            StatusCode::OK => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let (app, _clock, _dir) = setup_test_app();
    register(&app, "a@x.com").await;

    let (wrong_status, wrong_body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/login",
            &json!({ "email": "a@x.com", "password": "Wrong123!" }),
            None,
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/login",
            &json!({ "email": "nobody@x.com", "password": PASSWORD }),
            None,
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_token_expires_after_ttl() {
    let (app, clock, _dir) = setup_test_app();
    register(&app, "a@x.com").await;
    let token = login(&app, "a@x.com").await;

    clock.advance(Duration::seconds(3599));
    let (status, _) = send(&app, get_request("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::seconds(1));
    let (status, body) = send(&app, get_request("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_001");
}

#[tokio::test]
async fn test_accounts_survive_restart() {
    let dir = TempDir::new().unwrap();
    let clock = test_clock();

    let first = routes::create_router(state_at(dir.path(), &clock));
    register(&first, "a@x.com").await;
    let token = login(&first, "a@x.com").await;
    drop(first);

    // Same secret and directory: old tokens and credentials keep working
    let second = routes::create_router(state_at(dir.path(), &clock));
    let (status, _) = send(&second, get_request("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    login(&second, "a@x.com").await;
}

#[tokio::test]
async fn test_underage_registration_rejected() {
    let (app, _clock, _dir) = setup_test_app();
    let mut request = registration("kid@x.com");
    request["dob"] = json!("2006-06-16");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/v1/users/register", &request, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["dob"].is_array());
}

#[tokio::test]
async fn test_unknown_gender_is_invalid_input() {
    let (app, _clock, _dir) = setup_test_app();
    let mut request = registration("a@x.com");
    request["gender"] = json!("unknown");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/v1/users/register", &request, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_002");
}

#[tokio::test]
async fn test_longest_and_percent_emails_register_and_login() {
    let (app, _clock, _dir) = setup_test_app();
    let longest = format!("{}@example.com", "a".repeat(242));
    let percent = format!("{}@x.com", "%".repeat(80));

    for email in [longest.as_str(), percent.as_str()] {
        register(&app, email).await;
        login(&app, email).await;
    }
}

#[tokio::test]
async fn test_oversized_unknown_email_login_is_unauthorized() {
    let (app, _clock, _dir) = setup_test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/login",
            &json!({ "email": format!("{}@x.com", "b".repeat(300)), "password": PASSWORD }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_002");
}
