use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest,
            MessageResponse, RefreshRequest, RegisterRequest, ResetPasswordRequest,
        },
        services,
    },
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .route("/google-login", post(google_login))
        .route("/forgot-password", post(forgot_password))
}

/// Links arrive from email clients with or without the trailing slash.
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/verify-email/:uid/:token", get(verify_email))
        .route("/verify-email/:uid/:token/", get(verify_email))
        .route("/reset-password/:uid/:token", post(reset_password))
        .route("/reset-password/:uid/:token/", post(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Account created! Please verify your email.",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services::refresh(&state, &payload.refresh).await?))
}

#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::verify_email(&state, &uid, &token).await?;
    Ok(Json(MessageResponse::new("Email verified successfully!")))
}

#[instrument(skip(state, payload))]
pub async fn google_login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services::google_login(&state, payload.code).await?))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::forgot_password(&state, payload).await?;
    Ok(Json(MessageResponse::new(
        "If an account exists for that email, a password reset link has been sent.",
    )))
}

#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::reset_password(&state, &uid, &token, payload).await?;
    Ok(Json(MessageResponse::new("Password has been reset successfully.")))
}
