use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    mail::messages,
    reminders::{
        dto::{CreateReminderRequest, UpdateReminderRequest},
        repo_types::Reminder,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route(
            "/reminders/:id",
            put(update_reminder).delete(delete_reminder),
        )
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    Ok(Json(state.reminders.list(user_id).await?))
}

/// Creates the reminder and, when notifications are on, mails a confirmation.
/// A failed confirmation does not fail the request.
#[instrument(skip(state, payload))]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateReminderRequest>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let new = payload.validate()?;
    let reminder = state.reminders.create(user_id, &new).await?;
    info!(%user_id, reminder_id = %reminder.id, "reminder created");

    if reminder.email_notify {
        match state.users.find_by_id(user_id).await {
            Ok(Some(user)) if !user.email.trim().is_empty() => {
                let email = messages::reminder_created(
                    &user.email,
                    &reminder.title,
                    &reminder.description,
                    reminder.date,
                    reminder.time,
                );
                if let Err(e) = state.mailer.send(email).await {
                    warn!(error = %e, reminder_id = %reminder.id, "reminder confirmation not sent");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, %user_id, "could not load reminder owner"),
        }
    }

    Ok((StatusCode::CREATED, Json(reminder)))
}

#[instrument(skip(state, payload))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateReminderRequest>,
) -> Result<Json<Reminder>, ApiError> {
    let patch = payload.validate()?;
    state
        .reminders
        .update(user_id, id, &patch)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Reminder"))
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.reminders.delete(user_id, id).await? {
        info!(%user_id, reminder_id = %id, "reminder deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Reminder"))
    }
}
