use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use db::models::user::{CreateUser, UpdateUser, User, UserDetail, UserWithOrders};
use uuid::Uuid;

use crate::{auth::CallerIdentity, error::ApiError, AppState};

/// GET /api/users — the 20 most recently updated users with their
/// orders.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<UserWithOrders>>, ApiError> {
    let users = User::find_recent_with_orders(&state.pool)
        .await
        .map_err(|e| ApiError::db("USERS_GET", e))?;
    Ok(ResponseJson(users))
}

/// POST /api/users
pub async fn create_user(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateUser>,
) -> Result<ResponseJson<User>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::required("Email"));
    }
    let user = User::create(&state.pool, &payload)
        .await
        .map_err(|e| ApiError::db("USER_POST", e))?;
    Ok(ResponseJson(user))
}

/// GET /api/users/{id} — detail view with orders and addresses.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<UserDetail>, ApiError> {
    User::find_detail(&state.pool, id)
        .await
        .map_err(|e| ApiError::db("USER_GET", e))?
        .map(ResponseJson)
        .ok_or(ApiError::NotFound("user"))
}

/// PATCH /api/users/{id}
pub async fn update_user(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateUser>,
) -> Result<ResponseJson<User>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::required("Email"));
    }
    let user = User::update(&state.pool, id, &payload)
        .await
        .map_err(|e| ApiError::model("USER_PATCH", e))?;
    Ok(ResponseJson(user))
}

/// DELETE /api/users/{id} — conflicts while orders reference the
/// user; addresses cascade.
pub async fn delete_user(
    _caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<User>, ApiError> {
    let user = User::delete(&state.pool, id)
        .await
        .map_err(|e| ApiError::model("USER_DELETE", e))?;
    Ok(ResponseJson(user))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}
