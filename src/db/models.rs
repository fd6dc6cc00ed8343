use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: String,
    pub marital_status: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub joined: String,
    #[sqlx(flatten)]
    pub location: Location,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    #[default]
    Personal,
    Actor,
    Admin,
}

impl AccountType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Actor => "ACTOR",
            Self::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaritalStatus {
    Married,
    Single,
    Widowed,
}

impl MaritalStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Married => "MARRIED",
            Self::Single => "SINGLE",
            Self::Widowed => "WIDOWED",
        }
    }
}

/// Data for inserting a new user. Also the signup body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    #[serde(default)]
    pub account_type: AccountType,
    pub marital_status: Option<MaritalStatus>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub location: Option<Location>,
}

/// Partial update of a user. Absent fields keep their stored value.
///
/// An empty `password` also keeps the stored hash.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: Option<AccountType>,
    pub marital_status: Option<MaritalStatus>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub location: Option<Location>,
}

/// A login session backing the `session` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

/// Denormalized counters stored on a tuit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TuitStats {
    pub replies: i64,
    pub retuits: i64,
    pub likes: i64,
    pub dislikes: i64,
}

/// A short post.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tuit {
    pub id: i64,
    pub tuit: String,
    pub posted_by: i64,
    pub posted_on: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
    #[sqlx(flatten)]
    pub stats: TuitStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTuit {
    pub tuit: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuitUpdate {
    pub tuit: Option<String>,
    pub image: Option<String>,
    pub youtube: Option<String>,
}

/// Tuit with its author populated and flags relative to the viewing user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitDisplay {
    pub id: i64,
    pub tuit: String,
    pub posted_by: Option<User>,
    pub posted_on: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub stats: TuitStats,
    #[serde(skip_serializing_if = "is_false")]
    pub liked_by_me: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub disliked_by_me: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub bookmarked_by_me: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub posted_by_me: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A like or dislike join record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRecord {
    pub id: i64,
    pub user_id: i64,
    pub tuit_id: i64,
    pub created_at: String,
}

/// Like or dislike with both sides populated.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionDisplay {
    pub id: i64,
    pub tuit: TuitDisplay,
    pub user: User,
}

/// Result of toggling a like or dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// Whether the user holds the reaction after the toggle.
    pub active: bool,
    /// Number of reactions of this kind on the tuit, as now cached in its stats.
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: i64,
    pub user_following: i64,
    pub user_followed: i64,
    pub followed_on: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowDisplay {
    pub id: i64,
    pub user_following: User,
    pub user_followed: User,
    pub followed_on: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub tuit_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDisplay {
    pub id: i64,
    pub bookmarked_tuit: TuitDisplay,
    pub bookmarked_by: User,
}

/// A direct message between two users.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub message: String,
    #[serde(rename = "from")]
    pub from_user: i64,
    #[serde(rename = "to")]
    pub to_user: i64,
    pub sent_on: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub message: String,
}

/// An image attached to a tuit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub attached_by: i64,
    pub image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub image: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub poster: Option<String>,
    pub rating: f64,
    pub likes: i64,
    pub dislikes: i64,
}

/// Movie body for create and the like/dislike upserts.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub poster: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub poster: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ReviewStats {
    pub replies: i64,
    pub reposts: i64,
    pub likes: i64,
    pub dislikes: i64,
}

/// A user's review of a movie.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub review: String,
    #[serde(rename = "from")]
    pub from_user: i64,
    #[serde(rename = "to")]
    pub to_movie: i64,
    pub posted_on: String,
    pub rating: f64,
    #[sqlx(flatten)]
    pub stats: ReviewStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReview {
    #[serde(default)]
    pub review: String,
    pub rating: Option<f64>,
}

/// An acting credit: a user appearing in a movie.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Act {
    pub id: i64,
    pub acted_by: i64,
    pub movie_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActDisplay {
    pub id: i64,
    pub acted_by: User,
    pub movie: Movie,
}
