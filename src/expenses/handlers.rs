use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    expenses::{
        dto::{CreateExpenseRequest, UpdateExpenseRequest},
        repo_types::Expense,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let rows = state.expenses.list(user_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let new = payload.validate()?;
    let expense = state.expenses.create(user_id, &new).await?;
    info!(%user_id, expense_id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state))]
pub async fn get_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Expense>, ApiError> {
    state
        .expenses
        .get(user_id, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Expense"))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let patch = payload.validate()?;
    state
        .expenses
        .update(user_id, id, &patch)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Expense"))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.expenses.delete(user_id, id).await? {
        info!(%user_id, expense_id = %id, "expense deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Expense"))
    }
}
