use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, Act, ActDisplay};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/acts", get(find_all_acts))
        .route("/api/acts/:aid", delete(delete_act))
        .route("/api/users/:uid/acts", get(find_acts_by_user))
        .route("/api/movies/:mid/actors", get(find_actors_by_movie))
        .route(
            "/api/users/:uid/acts/:mid",
            get(find_act).post(create_act),
        )
}

/// GET /api/acts
async fn find_all_acts(State(state): State<AppState>) -> Result<Json<Vec<ActDisplay>>, ApiError> {
    Ok(Json(queries::find_all_acts(state.db.pool()).await?))
}

/// GET /api/users/:uid/acts - movies the user acted in
async fn find_acts_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<ActDisplay>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_acts_by_user(state.db.pool(), user_id).await?))
}

/// GET /api/movies/:mid/actors
async fn find_actors_by_movie(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
) -> Result<Json<Vec<ActDisplay>>, ApiError> {
    Ok(Json(queries::find_acts_by_movie(state.db.pool(), mid).await?))
}

/// GET /api/users/:uid/acts/:mid - the credit or `null`
async fn find_act(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
) -> Result<Json<Option<Act>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_act(state.db.pool(), user_id, mid).await?))
}

/// POST /api/users/:uid/acts/:mid - 404 if the movie does not exist
async fn create_act(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
) -> Result<Json<Act>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    queries::create_act(state.db.pool(), user_id, mid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/acts/:aid
async fn delete_act(
    State(state): State<AppState>,
    Path(aid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_act(state.db.pool(), aid).await?;
    Ok(Json(deleted.into()))
}
