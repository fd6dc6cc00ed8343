use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::auth::MaybeUser;
use crate::db::{self as queries, Movie};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/:uid/watchlist", get(find_watchlist))
        .route(
            "/api/users/:uid/watchlist/:mid",
            post(add_to_watchlist).delete(remove_from_watchlist),
        )
}

/// GET /api/users/:uid/watchlist
async fn find_watchlist(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_watchlist(state.db.pool(), user_id).await?))
}

/// POST /api/users/:uid/watchlist/:mid - returns the updated watchlist
async fn add_to_watchlist(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let pool = state.db.pool();
    let user_id = uid.resolve(pool, viewer.0.as_ref()).await?;
    if !queries::add_to_watchlist(pool, user_id, mid).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(queries::find_watchlist(pool, user_id).await?))
}

/// DELETE /api/users/:uid/watchlist/:mid - returns the updated watchlist
async fn remove_from_watchlist(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let pool = state.db.pool();
    let user_id = uid.resolve(pool, viewer.0.as_ref()).await?;
    queries::remove_from_watchlist(pool, user_id, mid).await?;
    Ok(Json(queries::find_watchlist(pool, user_id).await?))
}
