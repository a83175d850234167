use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    profile::{
        dto::{ProfileResponse, ProfileUpdated, UpdateProfileRequest},
        services,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    Ok(Json(services::get_profile(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdated>, ApiError> {
    let user = services::update_profile(&state, user_id, payload).await?;
    Ok(Json(ProfileUpdated {
        message: "Profile updated",
        user,
    }))
}
