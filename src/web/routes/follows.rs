use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, Follow, FollowDisplay};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/follows", get(find_all_follows))
        .route("/api/users/:uid/followings", get(find_followings))
        .route("/api/users/:uid/followers", get(find_followers))
        .route(
            "/api/users/:uid/follows/:other",
            get(find_follow).post(follow_user),
        )
        .route("/api/users/:uid/unfollows/:other", delete(unfollow_user))
        .route(
            "/api/users/:uid/removesFollower/:other",
            delete(remove_follower),
        )
}

/// Resolve both users of a pair route.
async fn resolve_pair(
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
    other: &UserRef,
) -> Result<(i64, i64), ApiError> {
    let pool = state.db.pool();
    let viewer = viewer.0.as_ref();
    Ok((
        uid.resolve(pool, viewer).await?,
        other.resolve(pool, viewer).await?,
    ))
}

/// GET /api/follows
async fn find_all_follows(
    State(state): State<AppState>,
) -> Result<Json<Vec<FollowDisplay>>, ApiError> {
    Ok(Json(queries::find_all_follows(state.db.pool()).await?))
}

/// GET /api/users/:uid/followings - users `uid` follows
async fn find_followings(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<FollowDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_followings(state.db.pool(), user_id).await?))
}

/// GET /api/users/:uid/followers - users following `uid`
async fn find_followers(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<FollowDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_followers(state.db.pool(), user_id).await?))
}

/// GET /api/users/:uid/follows/:other - the follow record or `null`
async fn find_follow(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
) -> Result<Json<Option<Follow>>, ApiError> {
    let (follower, followed) = resolve_pair(&state, &viewer, &uid, &other).await?;
    Ok(Json(
        queries::find_follow(state.db.pool(), follower, followed).await?,
    ))
}

/// POST /api/users/:uid/follows/:other
async fn follow_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
) -> Result<Json<Follow>, ApiError> {
    let (follower, followed) = resolve_pair(&state, &viewer, &uid, &other).await?;
    let follow = queries::follow_user(state.db.pool(), follower, followed).await?;
    tracing::info!(follower, followed, "User followed");
    Ok(Json(follow))
}

/// DELETE /api/users/:uid/unfollows/:other
async fn unfollow_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let (follower, followed) = resolve_pair(&state, &viewer, &uid, &other).await?;
    let deleted = queries::unfollow_user(state.db.pool(), follower, followed).await?;
    Ok(Json(deleted.into()))
}

/// DELETE /api/users/:uid/removesFollower/:other - `other` stops following `uid`
async fn remove_follower(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let (followed, follower) = resolve_pair(&state, &viewer, &uid, &other).await?;
    let deleted = queries::unfollow_user(state.db.pool(), follower, followed).await?;
    Ok(Json(deleted.into()))
}
