use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::{DeleteStatus, UpdateStatus};
use crate::auth::MaybeUser;
use crate::db::{self as queries, NewTuit, TuitDisplay, TuitUpdate};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tuits", get(find_all_tuits).delete(delete_all_tuits))
        .route(
            "/api/tuits/:tid",
            get(find_tuit).put(update_tuit).delete(delete_tuit),
        )
        .route(
            "/api/users/:uid/tuits",
            get(find_tuits_by_user).post(create_tuit),
        )
}

/// GET /api/tuits
async fn find_all_tuits(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> Result<Json<Vec<TuitDisplay>>, ApiError> {
    Ok(Json(
        queries::find_all_tuits(state.db.pool(), viewer.id()).await?,
    ))
}

/// GET /api/users/:uid/tuits
async fn find_tuits_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<TuitDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_tuits_by_user(state.db.pool(), user_id, viewer.id()).await?,
    ))
}

/// GET /api/tuits/:tid
async fn find_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(tid): Path<i64>,
) -> Result<Json<TuitDisplay>, ApiError> {
    queries::find_tuit_by_id(state.db.pool(), tid, viewer.id())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// POST /api/users/:uid/tuits
async fn create_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
    Json(tuit): Json<NewTuit>,
) -> Result<Json<TuitDisplay>, ApiError> {
    let pool = state.db.pool();
    let user_id = uid.resolve(pool, viewer.0.as_ref()).await?;
    let id = queries::create_tuit(pool, user_id, &tuit).await?;

    tracing::info!(tuit_id = id, user_id, "Created tuit");
    queries::find_tuit_by_id(pool, id, viewer.id())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /api/tuits/:tid
async fn update_tuit(
    State(state): State<AppState>,
    Path(tid): Path<i64>,
    Json(update): Json<TuitUpdate>,
) -> Result<Json<UpdateStatus>, ApiError> {
    let modified = queries::update_tuit(state.db.pool(), tid, &update).await?;
    Ok(Json(modified.into()))
}

/// DELETE /api/tuits/:tid
async fn delete_tuit(
    State(state): State<AppState>,
    Path(tid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_tuit(state.db.pool(), tid).await?;
    Ok(Json(deleted.into()))
}

/// DELETE /api/tuits
async fn delete_all_tuits(State(state): State<AppState>) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_tuits(state.db.pool()).await?;
    tracing::info!(deleted, "Deleted all tuits");
    Ok(Json(deleted.into()))
}
