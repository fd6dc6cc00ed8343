mod acts;
mod auth;
mod bookmarks;
mod follows;
mod images;
mod messages;
mod movies;
mod reactions;
mod reviews;
mod tuits;
mod users;
mod watchlist;

use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::AppState;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health))
        .merge(users::router())
        .merge(auth::router())
        .merge(tuits::router())
        .merge(reactions::router())
        .merge(follows::router())
        .merge(bookmarks::router())
        .merge(messages::router())
        .merge(movies::router())
        .merge(reviews::router())
        .merge(images::router())
        .merge(acts::router())
        .merge(watchlist::router())
}

async fn health() -> &'static str {
    "OK"
}

/// Body of delete endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub deleted_count: u64,
}

impl From<u64> for DeleteStatus {
    fn from(deleted_count: u64) -> Self {
        Self { deleted_count }
    }
}

/// Body of update endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub modified_count: u64,
}

impl From<u64> for UpdateStatus {
    fn from(modified_count: u64) -> Self {
        Self { modified_count }
    }
}
