use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, NewReview, Review};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", get(find_all_reviews).delete(delete_all_reviews))
        .route("/api/reviews/:rid", delete(delete_review))
        .route("/api/users/:uid/reviews", get(find_reviews_by_user))
        .route("/api/movies/:mid/reviews", get(find_reviews_by_movie))
        .route(
            "/api/users/:uid/reviews/:mid",
            get(find_user_reviews_of_movie).post(create_review),
        )
}

/// GET /api/reviews
async fn find_all_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(queries::find_all_reviews(state.db.pool()).await?))
}

/// GET /api/users/:uid/reviews
async fn find_reviews_by_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_reviews_by_user(state.db.pool(), user_id).await?,
    ))
}

/// GET /api/movies/:mid/reviews
async fn find_reviews_by_movie(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(queries::find_reviews_by_movie(state.db.pool(), mid).await?))
}

/// GET /api/users/:uid/reviews/:mid
async fn find_user_reviews_of_movie(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_user_reviews_of_movie(state.db.pool(), user_id, mid).await?,
    ))
}

/// POST /api/users/:uid/reviews/:mid - 404 if the movie does not exist
async fn create_review(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, mid)): Path<(UserRef, i64)>,
    Json(review): Json<NewReview>,
) -> Result<Json<Review>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    let review = queries::create_review(state.db.pool(), user_id, mid, &review)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(review_id = review.id, user_id, movie_id = mid, "Created review");
    Ok(Json(review))
}

/// DELETE /api/reviews/:rid
async fn delete_review(
    State(state): State<AppState>,
    Path(rid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_review(state.db.pool(), rid).await?;
    Ok(Json(deleted.into()))
}

/// DELETE /api/reviews
async fn delete_all_reviews(
    State(state): State<AppState>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_reviews(state.db.pool()).await?;
    Ok(Json(deleted.into()))
}
