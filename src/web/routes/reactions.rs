//! Likes and dislikes. Each route exists once per [`Reaction`] and shares its handler body.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, Reaction, ReactionDisplay, ReactionRecord, ToggleOutcome};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        // Likes
        .route("/api/users/:uid/likes", get(likes_by_user))
        .route("/api/tuits/:tid/likes", get(likes_by_tuit))
        .route("/api/likes", delete(delete_all_likes))
        .route(
            "/api/users/:uid/likes/:tid",
            get(find_like).post(like_tuit).put(toggle_like),
        )
        .route("/api/users/:uid/unlikes/:tid", delete(unlike_tuit))
        // Dislikes
        .route("/api/users/:uid/dislikes", get(dislikes_by_user))
        .route("/api/tuits/:tid/dislikes", get(dislikes_by_tuit))
        .route("/api/dislikes", delete(delete_all_dislikes))
        .route(
            "/api/users/:uid/dislikes/:tid",
            get(find_dislike).post(dislike_tuit).put(toggle_dislike),
        )
        .route("/api/users/:uid/undislikes/:tid", delete(undislike_tuit))
}

// ========== Shared bodies ==========

async fn by_user(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_reactions_by_user(state.db.pool(), reaction, user_id, viewer.id()).await?,
    ))
}

async fn by_tuit(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    tid: i64,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    Ok(Json(
        queries::find_reactions_by_tuit(state.db.pool(), reaction, tid, viewer.id()).await?,
    ))
}

async fn find_one(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
    tid: i64,
) -> Result<Json<Option<ReactionRecord>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_reaction(state.db.pool(), reaction, user_id, tid).await?,
    ))
}

async fn add(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
    tid: i64,
) -> Result<Json<ReactionRecord>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    queries::add_reaction(state.db.pool(), reaction, user_id, tid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn remove(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
    tid: i64,
) -> Result<Json<DeleteStatus>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    let deleted = queries::remove_reaction(state.db.pool(), reaction, user_id, tid).await?;
    Ok(Json(deleted.into()))
}

/// Any failure past user resolution is reported as 404, including a `:tid`
/// that is not a number.
async fn toggle(
    reaction: Reaction,
    state: &AppState,
    viewer: &MaybeUser,
    uid: &UserRef,
    tid: &str,
) -> Result<Json<ToggleOutcome>, ApiError> {
    let tid: i64 = tid.parse().map_err(|_| ApiError::NotFound)?;
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    match queries::toggle_reaction(state.db.pool(), reaction, user_id, tid).await {
        Ok(Some(outcome)) => {
            tracing::debug!(
                table = reaction.table(),
                user_id,
                tuit_id = tid,
                active = outcome.active,
                count = outcome.count,
                "Toggled reaction"
            );
            Ok(Json(outcome))
        }
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            tracing::error!(table = reaction.table(), "Toggle failed: {e:#}");
            Err(ApiError::NotFound)
        }
    }
}

async fn delete_all(
    reaction: Reaction,
    state: &AppState,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_reactions(state.db.pool(), reaction).await?;
    tracing::info!(table = reaction.table(), deleted, "Deleted all reactions");
    Ok(Json(deleted.into()))
}

// ========== Likes ==========

/// GET /api/users/:uid/likes
async fn likes_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    by_user(Reaction::Like, &state, &viewer, &uid).await
}

/// GET /api/tuits/:tid/likes
async fn likes_by_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(tid): Path<i64>,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    by_tuit(Reaction::Like, &state, &viewer, tid).await
}

/// GET /api/users/:uid/likes/:tid
async fn find_like(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<Option<ReactionRecord>>, ApiError> {
    find_one(Reaction::Like, &state, &viewer, &uid, tid).await
}

/// POST /api/users/:uid/likes/:tid
async fn like_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<ReactionRecord>, ApiError> {
    add(Reaction::Like, &state, &viewer, &uid, tid).await
}

/// DELETE /api/users/:uid/unlikes/:tid
async fn unlike_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<DeleteStatus>, ApiError> {
    remove(Reaction::Like, &state, &viewer, &uid, tid).await
}

/// PUT /api/users/:uid/likes/:tid
async fn toggle_like(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, String)>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    toggle(Reaction::Like, &state, &viewer, &uid, &tid).await
}

/// DELETE /api/likes
async fn delete_all_likes(State(state): State<AppState>) -> Result<Json<DeleteStatus>, ApiError> {
    delete_all(Reaction::Like, &state).await
}

// ========== Dislikes ==========

/// GET /api/users/:uid/dislikes
async fn dislikes_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    by_user(Reaction::Dislike, &state, &viewer, &uid).await
}

/// GET /api/tuits/:tid/dislikes
async fn dislikes_by_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(tid): Path<i64>,
) -> Result<Json<Vec<ReactionDisplay>>, ApiError> {
    by_tuit(Reaction::Dislike, &state, &viewer, tid).await
}

/// GET /api/users/:uid/dislikes/:tid
async fn find_dislike(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<Option<ReactionRecord>>, ApiError> {
    find_one(Reaction::Dislike, &state, &viewer, &uid, tid).await
}

/// POST /api/users/:uid/dislikes/:tid
async fn dislike_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<ReactionRecord>, ApiError> {
    add(Reaction::Dislike, &state, &viewer, &uid, tid).await
}

/// DELETE /api/users/:uid/undislikes/:tid
async fn undislike_tuit(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, i64)>,
) -> Result<Json<DeleteStatus>, ApiError> {
    remove(Reaction::Dislike, &state, &viewer, &uid, tid).await
}

/// PUT /api/users/:uid/dislikes/:tid
async fn toggle_dislike(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, tid)): Path<(UserRef, String)>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    toggle(Reaction::Dislike, &state, &viewer, &uid, &tid).await
}

/// DELETE /api/dislikes
async fn delete_all_dislikes(
    State(state): State<AppState>,
) -> Result<Json<DeleteStatus>, ApiError> {
    delete_all(Reaction::Dislike, &state).await
}
