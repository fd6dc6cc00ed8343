use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, Bookmark, BookmarkDisplay};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookmarks", get(find_all_bookmarks))
        .route("/api/users/:uid/bookmarks", get(find_bookmarks_by_user))
        .route("/api/tuits/:tid/bookmarks", get(find_bookmarks_by_tuit))
        .route("/api/users/:uid/bookmarks/:tid", post(bookmark_tuit))
        .route("/api/users/:uid/unbookmarks/:tid", delete(unbookmark_tuit))
}

/// GET /api/bookmarks
async fn find_all_bookmarks(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> Result<Json<Vec<BookmarkDisplay>>, ApiError> {
    Ok(Json(
        queries::find_all_bookmarks(state.db.pool(), viewer.id()).await?,
    ))
}

/// GET /api/users/:uid/bookmarks
async fn find_bookmarks_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<BookmarkDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_bookmarks_by_user(state.db.pool(), user_id, viewer.id()).await?,
    ))
}

/// GET /api/tuits/:tid/bookmarks
async fn find_bookmarks_by_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(tid): Path<i64>,
) -> Result<Json<Vec<BookmarkDisplay>>, ApiError> {
    Ok(Json(
        queries::find_bookmarks_by_tuit(state.db.pool(), tid, viewer.id()).await?,
    ))
}

/// POST /api/users/:uid/bookmarks/:tid - 404 if the tuit does not exist
async fn bookmark_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<Bookmark>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    queries::bookmark_tuit(state.db.pool(), user_id, tid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/users/:uid/unbookmarks/:tid
async fn unbookmark_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    let deleted = queries::unbookmark_tuit(state.db.pool(), user_id, tid).await?;
    Ok(Json(deleted.into()))
}
