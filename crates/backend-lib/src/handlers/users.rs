// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! HTTP handlers for `/api/v1/users`.
use crate::middleware::AuthenticatedUser;
use crate::{error::AppError, AppState};
use axum::{extract::FromRequest, extract::State, Json};
use std::sync::Arc;
use userbase_common::{
    ApiResponse, LoginRequest, LoginResponse, ProfileDetails, ProfilePatch, ProfileView,
    RegisterRequest, RegisterResponse,
};

/// JSON body extractor whose rejections render as [`AppError::InvalidInput`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// `POST /register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let user_id = state.accounts.register(request).await?;
    Ok(Json(ApiResponse::new("success", RegisterResponse { user_id })))
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let issued = state.accounts.login(request).await?;
    Ok(Json(ApiResponse::new(
        "login success",
        LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        },
    )))
}

/// `GET /profile`
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> ApiResult<ProfileView> {
    let view = state.accounts.get_profile(user.account_id).await?;
    Ok(Json(ApiResponse::new("profile fetched successfully", view)))
}

/// `PATCH /profile`
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> ApiResult<ProfileDetails> {
    let merged = state.accounts.update_profile(user.account_id, patch).await?;
    Ok(Json(ApiResponse::new(
        "profile updated successfully",
        ProfileDetails {
            address: merged.address,
            vehicle: merged.vehicle,
        },
    )))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
