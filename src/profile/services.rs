use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{
        repo_types::UserPatch,
        services::{is_valid_email, is_valid_username},
    },
    error::{ApiError, FieldErrors},
    formats::parse_date,
    profile::dto::{ProfileResponse, UpdateProfileRequest},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<ProfileResponse, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("User not found".into()))?;
    let profile = state.users.get_or_create_profile(user_id).await?;
    Ok(ProfileResponse::new(&user, &profile))
}

/// Applies a partial update. The email address may change without touching
/// the verification flag.
pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> Result<ProfileResponse, ApiError> {
    let mut errors = FieldErrors::default();
    let mut patch = UserPatch::default();

    if let Some(username) = req.username.map(|u| u.trim().to_string()) {
        if username.is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if !is_valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else {
            match state.users.find_by_username(&username).await? {
                Some(other) if other.id != user_id => {
                    errors.add("username", "A user with that username already exists.")
                }
                _ => patch.username = Some(username),
            }
        }
    }

    if let Some(email) = req.email.map(|e| e.trim().to_lowercase()) {
        if !is_valid_email(&email) {
            errors.add("email", "Enter a valid email address.");
        } else {
            match state.users.find_by_email(&email).await? {
                Some(other) if other.id != user_id => {
                    errors.add("email", "A user with that email already exists.")
                }
                _ => patch.email = Some(email),
            }
        }
    }

    if let Some(raw) = req.date_of_birth {
        match parse_date(&raw) {
            Some(date) => patch.date_of_birth = Some(date),
            None => errors.add("date_of_birth", "Date has wrong format. Use YYYY-MM-DD."),
        }
    }

    patch.first_name = req.first_name.map(|s| s.trim().to_string());
    patch.last_name = req.last_name.map(|s| s.trim().to_string());

    errors.into_result()?;

    state
        .users
        .update(user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("User not found".into()))?;
    info!(%user_id, "profile updated");

    get_profile(state, user_id).await
}
