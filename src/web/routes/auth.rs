//! Session-cookie authentication.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::{
    clear_session_cookie, generate_session_token, hash_password, session_cookie, session_expiry,
    session_token, verify_password, RequireUser,
};
use crate::db::{self as queries, NewUser, User};
use crate::web::{ApiError, AppState, UserRef};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/profile", post(profile))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Open a session for `user` and answer with the user and its cookie.
async fn start_session(state: &AppState, user: User) -> Result<Response, ApiError> {
    let token = generate_session_token();
    queries::create_session(state.db.pool(), user.id, &token, &session_expiry()).await?;

    let cookie = session_cookie(&token, state.config.secure_cookies());
    Ok(([(header::SET_COOKIE, cookie)], Json(user)).into_response())
}

/// POST /api/auth/signup - create an account and log it in. 403 if the username is taken,
/// 400 if it could be mistaken for `me` or an ID.
async fn signup(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<Response, ApiError> {
    UserRef::check_username(&new_user.username)?;
    let pool = state.db.pool();
    if queries::get_user_by_username(pool, &new_user.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Forbidden);
    }

    let password_hash = hash_password(&new_user.password)?;
    // A concurrent signup can still win the race; the insert reports it
    let Some(id) = queries::create_user(pool, &new_user, &password_hash).await? else {
        return Err(ApiError::Forbidden);
    };
    let user = queries::get_user_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(user_id = id, username = %user.username, "User signed up");
    start_session(&state, user).await
}

/// POST /api/auth/login - 403 on unknown user or wrong password, with no cookie.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let Some(user) = queries::get_user_by_username(state.db.pool(), &request.username).await?
    else {
        return Err(ApiError::Forbidden);
    };

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::info!(username = %request.username, "Failed login");
        return Err(ApiError::Forbidden);
    }

    tracing::info!(user_id = user.id, "User logged in");
    start_session(&state, user).await
}

/// POST /api/auth/logout - drop the session, if any, and clear the cookie.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        queries::delete_session(state.db.pool(), token).await?;
    }

    let cookie = clear_session_cookie(state.config.secure_cookies());
    Ok(([(header::SET_COOKIE, cookie)], StatusCode::OK).into_response())
}

/// POST /api/auth/profile - the logged-in user. 403 without a session.
async fn profile(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}
