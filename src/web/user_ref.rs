use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use sqlx::SqlitePool;

use super::ApiError;
use crate::db::{self as queries, User};

/// A user named in a path segment.
///
/// `me` and `my` mean the logged-in user, an integer is a user ID, anything
/// else is a username. Usernames that would parse as `me`, `my` or an ID are
/// refused when accounts are created or renamed (see [`UserRef::check_username`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Me,
    Id(i64),
    Username(String),
}

impl FromStr for UserRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "me" | "my" => Self::Me,
            _ => s
                .parse()
                .map_or_else(|_| Self::Username(s.to_string()), Self::Id),
        })
    }
}

impl<'de> Deserialize<'de> for UserRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|e: Infallible| match e {}))
    }
}

impl UserRef {
    /// Accept `username` only if a path segment holding it resolves back to it.
    pub fn check_username(username: &str) -> Result<(), ApiError> {
        match username.parse::<Self>() {
            Ok(Self::Username(_)) if !username.is_empty() => Ok(()),
            _ => Err(ApiError::BadRequest(
                "username must not be empty, numeric, me or my",
            )),
        }
    }

    /// Resolve to the ID of an existing user.
    ///
    /// `Forbidden` for `me` without a session, `NotFound` for an unknown user.
    pub async fn resolve(&self, pool: &SqlitePool, viewer: Option<&User>) -> Result<i64, ApiError> {
        match self {
            Self::Me => viewer.map(|u| u.id).ok_or(ApiError::Forbidden),
            Self::Id(id) => {
                if queries::user_exists(pool, *id).await? {
                    Ok(*id)
                } else {
                    Err(ApiError::NotFound)
                }
            }
            Self::Username(username) => queries::get_user_by_username(pool, username)
                .await?
                .map(|u| u.id)
                .ok_or(ApiError::NotFound),
        }
    }
}
