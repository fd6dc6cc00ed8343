use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::models::{Act, ActDisplay, Movie, MovieUpdate, NewMovie, NewReview, Review};
use super::queries::{get_users_by_ids, placeholders, unique_ids, MAX_BATCH_IDS};
use super::reactions::Reaction;

// ========== Movies ==========

pub async fn find_all_movies(pool: &SqlitePool) -> Result<Vec<Movie>> {
    sqlx::query_as("SELECT * FROM movies ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch movies")
}

pub async fn find_movie(pool: &SqlitePool, id: i64) -> Result<Option<Movie>> {
    sqlx::query_as("SELECT * FROM movies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch movie by ID")
}

pub async fn find_movie_by_imdb_id(pool: &SqlitePool, imdb_id: &str) -> Result<Option<Movie>> {
    sqlx::query_as("SELECT * FROM movies WHERE imdb_id = ?")
        .bind(imdb_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch movie by IMDb ID")
}

/// Fetch movies by ID, keyed by ID.
pub async fn get_movies_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, Movie>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut movies = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_BATCH_IDS) {
        let query = format!(
            "SELECT * FROM movies WHERE id IN ({})",
            placeholders(chunk.len())
        );
        let mut query = sqlx::query_as::<_, Movie>(&query);
        for id in chunk {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(pool)
            .await
            .context("Failed to fetch movies by IDs")?;
        movies.extend(rows.into_iter().map(|m| (m.id, m)));
    }
    Ok(movies)
}

/// Insert a movie. Returns `None` if its IMDb ID is already present.
pub async fn create_movie(pool: &SqlitePool, movie: &NewMovie) -> Result<Option<Movie>> {
    sqlx::query_as(
        r"
        INSERT INTO movies (title, imdb_id, poster, rating)
        VALUES (?, ?, ?, COALESCE(?, 0))
        ON CONFLICT(imdb_id) DO NOTHING
        RETURNING *
        ",
    )
    .bind(&movie.title)
    .bind(&movie.imdb_id)
    .bind(&movie.poster)
    .bind(movie.rating)
    .fetch_optional(pool)
    .await
    .context("Failed to create movie")
}

/// Count one like or dislike on the movie with this IMDb ID.
///
/// A movie seen for the first time is created from `movie` with the counter at 1.
/// Only the counter matching `reaction` changes.
pub async fn react_to_movie(
    pool: &SqlitePool,
    reaction: Reaction,
    imdb_id: &str,
    movie: &NewMovie,
) -> Result<Movie> {
    let column = reaction.table();
    let query = format!(
        r"
        INSERT INTO movies (title, imdb_id, poster, rating, {column})
        VALUES (?, ?, ?, COALESCE(?, 0), 1)
        ON CONFLICT(imdb_id) DO UPDATE SET {column} = {column} + 1
        RETURNING *
        "
    );
    sqlx::query_as(&query)
        .bind(&movie.title)
        .bind(imdb_id)
        .bind(&movie.poster)
        .bind(movie.rating)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to add movie {column}"))
}

pub async fn update_movie(pool: &SqlitePool, id: i64, update: &MovieUpdate) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE movies SET
            title = COALESCE(?, title),
            imdb_id = COALESCE(?, imdb_id),
            poster = COALESCE(?, poster),
            rating = COALESCE(?, rating)
        WHERE id = ?
        ",
    )
    .bind(&update.title)
    .bind(&update.imdb_id)
    .bind(&update.poster)
    .bind(update.rating)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update movie")?;

    Ok(result.rows_affected())
}

/// Delete a movie. Its reviews, acts and watchlist entries cascade.
pub async fn delete_movie(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM movies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete movie")?;
    Ok(result.rows_affected())
}

pub async fn delete_all_movies(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM movies")
        .execute(pool)
        .await
        .context("Failed to delete all movies")?;
    Ok(result.rows_affected())
}

// ========== Reviews ==========

pub async fn find_all_reviews(pool: &SqlitePool) -> Result<Vec<Review>> {
    sqlx::query_as("SELECT * FROM reviews ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch reviews")
}

pub async fn find_reviews_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Review>> {
    sqlx::query_as("SELECT * FROM reviews WHERE from_user = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch reviews by user")
}

pub async fn find_reviews_by_movie(pool: &SqlitePool, movie_id: i64) -> Result<Vec<Review>> {
    sqlx::query_as("SELECT * FROM reviews WHERE to_movie = ? ORDER BY id")
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch reviews by movie")
}

/// Get the reviews one user wrote about one movie.
pub async fn find_user_reviews_of_movie(
    pool: &SqlitePool,
    user_id: i64,
    movie_id: i64,
) -> Result<Vec<Review>> {
    sqlx::query_as("SELECT * FROM reviews WHERE from_user = ? AND to_movie = ? ORDER BY id")
        .bind(user_id)
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch user reviews of movie")
}

/// Post a review. Returns `None` if the movie does not exist.
pub async fn create_review(
    pool: &SqlitePool,
    user_id: i64,
    movie_id: i64,
    review: &NewReview,
) -> Result<Option<Review>> {
    sqlx::query_as(
        r"
        INSERT INTO reviews (review, from_user, to_movie, rating)
        SELECT ?1, ?2, ?3, COALESCE(?4, 0) WHERE EXISTS (SELECT 1 FROM movies WHERE id = ?3)
        RETURNING *
        ",
    )
    .bind(&review.review)
    .bind(user_id)
    .bind(movie_id)
    .bind(review.rating)
    .fetch_optional(pool)
    .await
    .context("Failed to create review")
}

pub async fn delete_review(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete review")?;
    Ok(result.rows_affected())
}

pub async fn delete_all_reviews(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews")
        .execute(pool)
        .await
        .context("Failed to delete all reviews")?;
    Ok(result.rows_affected())
}

// ========== Acts ==========

async fn populate_acts(pool: &SqlitePool, acts: Vec<Act>) -> Result<Vec<ActDisplay>> {
    let user_ids = unique_ids(acts.iter().map(|a| a.acted_by));
    let movie_ids = unique_ids(acts.iter().map(|a| a.movie_id));
    let users = get_users_by_ids(pool, &user_ids).await?;
    let movies = get_movies_by_ids(pool, &movie_ids).await?;

    Ok(acts
        .into_iter()
        .filter_map(|a| {
            Some(ActDisplay {
                id: a.id,
                acted_by: users.get(&a.acted_by)?.clone(),
                movie: movies.get(&a.movie_id)?.clone(),
            })
        })
        .collect())
}

pub async fn find_all_acts(pool: &SqlitePool) -> Result<Vec<ActDisplay>> {
    let acts: Vec<Act> = sqlx::query_as("SELECT * FROM acts ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch acts")?;
    populate_acts(pool, acts).await
}

/// Get the movies a user acted in.
pub async fn find_acts_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<ActDisplay>> {
    let acts: Vec<Act> = sqlx::query_as("SELECT * FROM acts WHERE acted_by = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch acts by user")?;
    populate_acts(pool, acts).await
}

/// Get the cast of a movie.
pub async fn find_acts_by_movie(pool: &SqlitePool, movie_id: i64) -> Result<Vec<ActDisplay>> {
    let acts: Vec<Act> = sqlx::query_as("SELECT * FROM acts WHERE movie_id = ? ORDER BY id")
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch acts by movie")?;
    populate_acts(pool, acts).await
}

pub async fn find_act(pool: &SqlitePool, user_id: i64, movie_id: i64) -> Result<Option<Act>> {
    sqlx::query_as("SELECT * FROM acts WHERE acted_by = ? AND movie_id = ?")
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch act")
}

/// Credit a user in a movie. Returns `None` if the movie does not exist.
pub async fn create_act(pool: &SqlitePool, user_id: i64, movie_id: i64) -> Result<Option<Act>> {
    sqlx::query(
        r"
        INSERT INTO acts (acted_by, movie_id)
        SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM movies WHERE id = ?2)
        ON CONFLICT(acted_by, movie_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(movie_id)
    .execute(pool)
    .await
    .context("Failed to create act")?;

    find_act(pool, user_id, movie_id).await
}

pub async fn delete_act(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM acts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete act")?;
    Ok(result.rows_affected())
}

// ========== Watchlist ==========

/// Get the movies on a user's watchlist, oldest entry first.
pub async fn find_watchlist(pool: &SqlitePool, user_id: i64) -> Result<Vec<Movie>> {
    sqlx::query_as(
        r"
        SELECT m.* FROM watchlist w
        JOIN movies m ON m.id = w.movie_id
        WHERE w.user_id = ?
        ORDER BY w.id
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch watchlist")
}

/// Put a movie on a user's watchlist. Returns `false` if the movie does not exist.
pub async fn add_to_watchlist(pool: &SqlitePool, user_id: i64, movie_id: i64) -> Result<bool> {
    sqlx::query(
        r"
        INSERT INTO watchlist (user_id, movie_id)
        SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM movies WHERE id = ?2)
        ON CONFLICT(user_id, movie_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(movie_id)
    .execute(pool)
    .await
    .context("Failed to add to watchlist")?;

    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM watchlist WHERE user_id = ? AND movie_id = ?)")
            .bind(user_id)
            .bind(movie_id)
            .fetch_one(pool)
            .await
            .context("Failed to check watchlist entry")?;
    Ok(row.0)
}

pub async fn remove_from_watchlist(pool: &SqlitePool, user_id: i64, movie_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM watchlist WHERE user_id = ? AND movie_id = ?")
        .bind(user_id)
        .bind(movie_id)
        .execute(pool)
        .await
        .context("Failed to remove from watchlist")?;
    Ok(result.rows_affected())
}
