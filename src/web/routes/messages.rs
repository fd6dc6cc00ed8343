use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use super::DeleteStatus;
use crate::auth::MaybeUser;
use crate::db::{self as queries, Message, NewMessage};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/:uid/messages/sent", get(find_sent))
        .route("/api/users/:uid/messages/received", get(find_received))
        .route(
            "/api/users/:uid/messages/:other",
            get(find_between).post(send_message),
        )
        .route("/api/messages/:mid", delete(delete_message))
        .route("/api/messages", delete(delete_all_messages))
}

/// GET /api/users/:uid/messages/sent
async fn find_sent(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(queries::find_sent_messages(state.db.pool(), user_id).await?))
}

/// GET /api/users/:uid/messages/received
async fn find_received(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(uid): Path<UserRef>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user_id = uid.resolve(state.db.pool(), viewer.0.as_ref()).await?;
    Ok(Json(
        queries::find_received_messages(state.db.pool(), user_id).await?,
    ))
}

/// GET /api/users/:uid/messages/:other - messages `uid` sent to `other`
async fn find_between(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let pool = state.db.pool();
    let from = uid.resolve(pool, viewer.0.as_ref()).await?;
    let to = other.resolve(pool, viewer.0.as_ref()).await?;
    Ok(Json(queries::find_messages_between(pool, from, to).await?))
}

/// POST /api/users/:uid/messages/:other
async fn send_message(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path((uid, other)): Path<(UserRef, UserRef)>,
    Json(body): Json<NewMessage>,
) -> Result<Json<Message>, ApiError> {
    let pool = state.db.pool();
    let from = uid.resolve(pool, viewer.0.as_ref()).await?;
    let to = other.resolve(pool, viewer.0.as_ref()).await?;
    let message = queries::send_message(pool, from, to, &body.message).await?;
    tracing::debug!(message_id = message.id, from, to, "Message sent");
    Ok(Json(message))
}

/// DELETE /api/messages/:mid
async fn delete_message(
    State(state): State<AppState>,
    Path(mid): Path<i64>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_message(state.db.pool(), mid).await?;
    Ok(Json(deleted.into()))
}

/// DELETE /api/messages
async fn delete_all_messages(
    State(state): State<AppState>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let deleted = queries::delete_all_messages(state.db.pool()).await?;
    Ok(Json(deleted.into()))
}
