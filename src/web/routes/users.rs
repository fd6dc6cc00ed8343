use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::{hash_password, MaybeUser};
use crate::db::{self as queries, NewUser, User, UserUpdate};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(find_all_users)
                .post(create_user)
                .delete(delete_all_users),
        )
        .route(
            "/api/users/:uid",
            get(find_user).put(update_user).delete(delete_user),
        )
        .route(
            "/api/users/username/:username",
            get(find_user_by_username).delete(delete_user_by_username),
        )
}

/// GET /api/users
async fn find_all_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(queries::get_all_users(state.db.pool()).await?))
}

/// POST /api/users - create a user directly. 403 if the username is taken.
async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    UserRef::check_username(&new_user.username)?;
    let password_hash = hash_password(&new_user.password)?;
    let Some(id) = queries::create_user(state.db.pool(), &new_user, &password_hash).await? else {
        return Err(ApiError::Forbidden);
    };

    tracing::info!(user_id = id, username = %new_user.username, "Created user");
    queries::get_user_by_id(state.db.pool(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /api/users/:uid
async fn find_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<User>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    queries::get_user_by_id(state.db.pool(), user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /api/users/:uid - partial update; returns the updated user.
///
/// An empty password keeps the stored one. Renaming onto a taken username is 403.
async fn update_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let pool = state.db.pool();
    let user_id = uid.resolve(pool, viewer.0.as_ref()).await?;

    if let Some(username) = &update.username {
        UserRef::check_username(username)?;
        if let Some(existing) = queries::get_user_by_username(pool, username).await? {
            if existing.id != user_id {
                return Err(ApiError::Forbidden);
            }
        }
    }

    let password_hash = match update.password.as_deref() {
        Some(password) if !password.is_empty() => Some(hash_password(password)?),
        _ => None,
    };

    queries::update_user(pool, user_id, &update, password_hash.as_deref()).await?;
    queries::get_user_by_id(pool, user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/users/:uid
async fn delete_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    let deleted = queries::delete_user(state.db.pool(), user_id).await?;
    tracing::info!(user_id, "Deleted user");
    Ok(Json(deleted.into()))
}

/// DELETE /api/users
async fn delete_all_users(State(state): State<AppState>) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_users(state.db.pool()).await?;
    tracing::info!(deleted, "Deleted all users");
    Ok(Json(deleted.into()))
}

/// GET /api/users/username/:username
async fn find_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    queries::get_user_by_username(state.db.pool(), &username)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/users/username/:username
async fn delete_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_user_by_username(state.db.pool(), &username).await?;
    Ok(Json(deleted.into()))
}

