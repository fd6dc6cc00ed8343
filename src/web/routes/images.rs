use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::DeleteStatus;
use crate::db::{self as queries, Image, NewImage};
use crate::web::{ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/images", get(find_all_images))
        .route("/api/images/:pid", get(find_image).delete(delete_image))
        .route(
            "/api/tuits/:tid/images",
            get(find_images_by_tuit)
                .post(attach_image)
                .delete(delete_images_by_tuit),
        )
}

/// GET /api/images
async fn find_all_images(State(state): State<AppState>) -> Result<Json<Vec<Image>>, ApiError> {
    Ok(Json(queries::find_all_images(state.db.pool()).await?))
}

/// GET /api/images/:pid
async fn find_image(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
) -> Result<Json<Image>, ApiError> {
    queries::find_image(state.db.pool(), pid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/images/:pid
async fn delete_image(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_image(state.db.pool(), pid).await?;
    Ok(Json(deleted.into()))
}

/// GET /api/tuits/:tid/images
async fn find_images_by_tuit(
    State(state): State<AppState>,
    Path(tid): Path<i64>,
) -> Result<Json<Vec<Image>>, ApiError> {
    Ok(Json(queries::find_images_by_tuit(state.db.pool(), tid).await?))
}

/// POST /api/tuits/:tid/images - 404 if the tuit does not exist
async fn attach_image(
    State(state): State<AppState>,
    Path(tid): Path<i64>,
    Json(body): Json<NewImage>,
) -> Result<Json<Image>, ApiError> {
    queries::attach_image(state.db.pool(), tid, &body.image)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// DELETE /api/tuits/:tid/images
async fn delete_images_by_tuit(
    State(state): State<AppState>,
    Path(tid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_images_by_tuit(state.db.pool(), tid).await?;
    Ok(Json(deleted.into()))
}
