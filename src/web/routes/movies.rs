use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{DeleteStatus, UpdateStatus};
use crate::db::{self as queries, Movie, MovieUpdate, NewMovie, Reaction};
use crate::web::{ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/movies",
            get(find_all_movies)
                .post(create_movie)
                .delete(delete_all_movies),
        )
        .route("/api/movies/likes", post(like_movie))
        .route("/api/movies/dislikes", post(dislike_movie))
        .route(
            "/api/movies/:mid",
            get(find_movie).put(update_movie).delete(delete_movie),
        )
        .route("/api/movies/imdb/:imdb_id", get(find_movie_by_imdb_id))
}

/// GET /api/movies
async fn find_all_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    Ok(Json(queries::find_all_movies(state.db.pool()).await?))
}

/// POST /api/movies - 403 if the IMDb ID is already present
async fn create_movie(
    State(state): State<AppState>,
    Json(movie): Json<NewMovie>,
) -> Result<Json<Movie>, ApiError> {
    queries::create_movie(state.db.pool(), &movie)
        .await?
        .map(Json)
        .ok_or(ApiError::Forbidden)
}

async fn react(
    reaction: Reaction,
    state: &AppState,
    movie: &NewMovie,
) -> Result<Json<Movie>, ApiError> {
    let Some(imdb_id) = movie.imdb_id.as_deref() else {
        return Err(ApiError::BadRequest("imdbID is required"));
    };
    let movie = queries::react_to_movie(state.db.pool(), reaction, imdb_id, movie).await?;
    Ok(Json(movie))
}

/// POST /api/movies/likes - count a like, creating the movie on first sight
async fn like_movie(
    State(state): State<AppState>,
    Json(movie): Json<NewMovie>,
) -> Result<Json<Movie>, ApiError> {
    react(Reaction::Like, &state, &movie).await
}

/// POST /api/movies/dislikes
async fn dislike_movie(
    State(state): State<AppState>,
    Json(movie): Json<NewMovie>,
) -> Result<Json<Movie>, ApiError> {
    react(Reaction::Dislike, &state, &movie).await
}

/// GET /api/movies/:mid
async fn find_movie(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
) -> Result<Json<Movie>, ApiError> {
    queries::find_movie(state.db.pool(), mid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /api/movies/imdb/:imdb_id
async fn find_movie_by_imdb_id(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    queries::find_movie_by_imdb_id(state.db.pool(), &imdb_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /api/movies/:mid
async fn update_movie(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
    Json(update): Json<MovieUpdate>,
) -> Result<Json<UpdateStatus>, ApiError> {
    let modified = queries::update_movie(state.db.pool(), mid, &update).await?;
    Ok(Json(modified.into()))
}

/// DELETE /api/movies/:mid
async fn delete_movie(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_movie(state.db.pool(), mid).await?;
    Ok(Json(deleted.into()))
}

/// DELETE /api/movies
async fn delete_all_movies(State(state): State<AppState>) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_movies(state.db.pool()).await?;
    Ok(Json(deleted.into()))
}
