use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

use super::models::{
    Bookmark, BookmarkDisplay, Follow, FollowDisplay, Image, Message, NewTuit, NewUser, Session,
    Tuit, TuitDisplay, TuitUpdate, User, UserUpdate,
};
use super::reactions::recount_tuits_reacted_by;

/// Most ids bound in one `IN (...)` list. SQLite caps a statement's variables.
pub(super) const MAX_BATCH_IDS: usize = 500;

/// `?, ?, ?` for an `IN (...)` list of `n` values.
pub(super) fn placeholders(n: usize) -> String {
    std::iter::repeat_n("?", n).collect::<Vec<_>>().join(",")
}

/// Sorted, deduplicated ids for a batched lookup.
pub(super) fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let set: HashSet<i64> = ids.into_iter().collect();
    let mut ids: Vec<i64> = set.into_iter().collect();
    ids.sort_unstable();
    ids
}

// ========== Users ==========

/// Get all users.
pub async fn get_all_users(pool: &SqlitePool) -> Result<Vec<User>> {
    sqlx::query_as("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch users")
}

/// Get a user by ID.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by ID")
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Check whether a user row exists.
pub async fn user_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check user existence")?;
    Ok(row.0)
}

/// Fetch users by ID, keyed by ID. Unknown IDs are absent from the map.
pub async fn get_users_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, User>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut users = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_BATCH_IDS) {
        let query = format!(
            "SELECT * FROM users WHERE id IN ({})",
            placeholders(chunk.len())
        );
        let mut query = sqlx::query_as::<_, User>(&query);
        for id in chunk {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(pool)
            .await
            .context("Failed to fetch users by IDs")?;
        users.extend(rows.into_iter().map(|u| (u.id, u)));
    }
    Ok(users)
}

/// Create a new user with an already hashed password.
///
/// Returns `None` when the username is taken.
pub async fn create_user(
    pool: &SqlitePool,
    user: &NewUser,
    password_hash: &str,
) -> Result<Option<i64>> {
    let location = user.location.unwrap_or_default();
    let result = sqlx::query(
        r"
        INSERT INTO users (
            username, password_hash, email, first_name, last_name, profile_photo,
            header_image, account_type, marital_status, biography, date_of_birth,
            latitude, longitude
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(username) DO NOTHING
        ",
    )
    .bind(&user.username)
    .bind(password_hash)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.profile_photo)
    .bind(&user.header_image)
    .bind(user.account_type.as_str())
    .bind(user.marital_status.map(|m| m.as_str()))
    .bind(&user.biography)
    .bind(&user.date_of_birth)
    .bind(location.latitude)
    .bind(location.longitude)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(result.last_insert_rowid()))
}

/// Update a user's fields. `None` fields keep their stored value.
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    update: &UserUpdate,
    password_hash: Option<&str>,
) -> Result<u64> {
    let location = update.location.unwrap_or_default();
    let result = sqlx::query(
        r"
        UPDATE users SET
            username = COALESCE(?, username),
            password_hash = COALESCE(?, password_hash),
            email = COALESCE(?, email),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            profile_photo = COALESCE(?, profile_photo),
            header_image = COALESCE(?, header_image),
            account_type = COALESCE(?, account_type),
            marital_status = COALESCE(?, marital_status),
            biography = COALESCE(?, biography),
            date_of_birth = COALESCE(?, date_of_birth),
            latitude = COALESCE(?, latitude),
            longitude = COALESCE(?, longitude)
        WHERE id = ?
        ",
    )
    .bind(&update.username)
    .bind(password_hash)
    .bind(&update.email)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.profile_photo)
    .bind(&update.header_image)
    .bind(update.account_type.map(|a| a.as_str()))
    .bind(update.marital_status.map(|m| m.as_str()))
    .bind(&update.biography)
    .bind(&update.date_of_birth)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(result.rows_affected())
}

/// Delete a user and everything they own.
///
/// Tuits the user liked or disliked get their counters recounted in the
/// same transaction.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<u64> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin user delete transaction")?;

    recount_tuits_reacted_by(&mut tx, id).await?;

    // Cascades to the user's reactions, tuits, follows and the rest
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete user")?;

    tx.commit().await.context("Failed to commit user delete")?;

    Ok(result.rows_affected())
}

/// Delete a user by username.
pub async fn delete_user_by_username(pool: &SqlitePool, username: &str) -> Result<u64> {
    match get_user_by_username(pool, username).await? {
        Some(user) => delete_user(pool, user.id).await,
        None => Ok(0),
    }
}

/// Delete every user. Cascades to all user-owned rows.
pub async fn delete_all_users(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users")
        .execute(pool)
        .await
        .context("Failed to delete all users")?;
    Ok(result.rows_affected())
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await
        .context("Failed to create session")?;

    Ok(result.last_insert_rowid())
}

/// Get an unexpired session by token.
pub async fn get_active_session(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ? AND expires_at > datetime('now')")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session by token")
}

/// Update session last_used_at.
pub async fn update_session_last_used(pool: &SqlitePool, session_id: i64) -> Result<()> {
    sqlx::query("UPDATE sessions SET last_used_at = datetime('now') WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await
        .context("Failed to update session last_used")?;
    Ok(())
}

/// Delete a session.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(())
}

/// Delete expired sessions.
pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
        .execute(pool)
        .await
        .context("Failed to delete expired sessions")?;
    Ok(result.rows_affected())
}

// ========== Tuits ==========

/// Tuit row plus flags relative to the viewer.
#[derive(Debug, sqlx::FromRow)]
struct TuitRow {
    #[sqlx(flatten)]
    tuit: Tuit,
    liked_by_me: bool,
    disliked_by_me: bool,
    bookmarked_by_me: bool,
}

/// Select tuits with viewer flags. Binds the viewer ID three times, then `filter`'s values.
fn tuit_display_sql(filter: &str) -> String {
    format!(
        r"
        SELECT t.*,
            EXISTS(SELECT 1 FROM likes l WHERE l.tuit_id = t.id AND l.user_id = ?) AS liked_by_me,
            EXISTS(SELECT 1 FROM dislikes d WHERE d.tuit_id = t.id AND d.user_id = ?) AS disliked_by_me,
            EXISTS(SELECT 1 FROM bookmarks b WHERE b.tuit_id = t.id AND b.user_id = ?) AS bookmarked_by_me
        FROM tuits t
        {filter}
        ORDER BY t.id
        "
    )
}

async fn query_tuit_displays(
    pool: &SqlitePool,
    filter: &str,
    args: &[i64],
    viewer: Option<i64>,
) -> Result<Vec<TuitDisplay>> {
    let sql = tuit_display_sql(filter);
    let mut query = sqlx::query_as::<_, TuitRow>(&sql)
        .bind(viewer)
        .bind(viewer)
        .bind(viewer);
    for arg in args {
        query = query.bind(arg);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch tuits")?;
    populate_tuits(pool, rows, viewer).await
}

/// Embed each tuit's author. Tuits whose author row is gone are skipped.
async fn populate_tuits(
    pool: &SqlitePool,
    rows: Vec<TuitRow>,
    viewer: Option<i64>,
) -> Result<Vec<TuitDisplay>> {
    let author_ids = unique_ids(rows.iter().map(|r| r.tuit.posted_by));
    let authors = get_users_by_ids(pool, &author_ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let author = authors.get(&row.tuit.posted_by)?.clone();
            Some(TuitDisplay {
                id: row.tuit.id,
                tuit: row.tuit.tuit,
                posted_by_me: viewer == Some(author.id),
                posted_by: Some(author),
                posted_on: row.tuit.posted_on,
                image: row.tuit.image,
                youtube: row.tuit.youtube,
                stats: row.tuit.stats,
                liked_by_me: row.liked_by_me,
                disliked_by_me: row.disliked_by_me,
                bookmarked_by_me: row.bookmarked_by_me,
            })
        })
        .collect())
}

/// Get all tuits, annotated for `viewer`.
pub async fn find_all_tuits(pool: &SqlitePool, viewer: Option<i64>) -> Result<Vec<TuitDisplay>> {
    query_tuit_displays(pool, "", &[], viewer).await
}

/// Get the tuits posted by a user.
pub async fn find_tuits_by_user(
    pool: &SqlitePool,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<TuitDisplay>> {
    query_tuit_displays(pool, "WHERE t.posted_by = ?", &[user_id], viewer).await
}

/// Get one tuit with its author.
pub async fn find_tuit_by_id(
    pool: &SqlitePool,
    id: i64,
    viewer: Option<i64>,
) -> Result<Option<TuitDisplay>> {
    let mut tuits = query_tuit_displays(pool, "WHERE t.id = ?", &[id], viewer).await?;
    Ok(tuits.pop())
}

/// Fetch tuits for display by ID, keyed by ID.
pub async fn get_tuits_display_by_ids(
    pool: &SqlitePool,
    ids: &[i64],
    viewer: Option<i64>,
) -> Result<HashMap<i64, TuitDisplay>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut tuits = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_BATCH_IDS) {
        let filter = format!("WHERE t.id IN ({})", placeholders(chunk.len()));
        let rows = query_tuit_displays(pool, &filter, chunk, viewer).await?;
        tuits.extend(rows.into_iter().map(|t| (t.id, t)));
    }
    Ok(tuits)
}

/// Get a raw tuit row by ID.
pub async fn get_tuit(pool: &SqlitePool, id: i64) -> Result<Option<Tuit>> {
    sqlx::query_as("SELECT * FROM tuits WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch tuit by ID")
}

/// Insert a new tuit, returning its ID.
pub async fn create_tuit(pool: &SqlitePool, posted_by: i64, tuit: &NewTuit) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO tuits (tuit, posted_by, image, youtube)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&tuit.tuit)
    .bind(posted_by)
    .bind(&tuit.image)
    .bind(&tuit.youtube)
    .execute(pool)
    .await
    .context("Failed to create tuit")?;

    Ok(result.last_insert_rowid())
}

/// Update a tuit's content. Counters are not writable here.
pub async fn update_tuit(pool: &SqlitePool, id: i64, update: &TuitUpdate) -> Result<u64> {
    let result = sqlx::query(
        r"
        UPDATE tuits SET
            tuit = COALESCE(?, tuit),
            image = COALESCE(?, image),
            youtube = COALESCE(?, youtube)
        WHERE id = ?
        ",
    )
    .bind(&update.tuit)
    .bind(&update.image)
    .bind(&update.youtube)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update tuit")?;

    Ok(result.rows_affected())
}

/// Delete a tuit. Its likes, dislikes, bookmarks and images cascade.
pub async fn delete_tuit(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tuits WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete tuit")?;
    Ok(result.rows_affected())
}

/// Delete every tuit.
pub async fn delete_all_tuits(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tuits")
        .execute(pool)
        .await
        .context("Failed to delete all tuits")?;
    Ok(result.rows_affected())
}

// ========== Follows ==========

async fn populate_follows(pool: &SqlitePool, follows: Vec<Follow>) -> Result<Vec<FollowDisplay>> {
    let ids = unique_ids(
        follows
            .iter()
            .flat_map(|f| [f.user_following, f.user_followed]),
    );
    let users = get_users_by_ids(pool, &ids).await?;

    Ok(follows
        .into_iter()
        .filter_map(|f| {
            Some(FollowDisplay {
                id: f.id,
                user_following: users.get(&f.user_following)?.clone(),
                user_followed: users.get(&f.user_followed)?.clone(),
                followed_on: f.followed_on,
            })
        })
        .collect())
}

/// Get every follow relationship.
pub async fn find_all_follows(pool: &SqlitePool) -> Result<Vec<FollowDisplay>> {
    let follows: Vec<Follow> = sqlx::query_as("SELECT * FROM follows ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch follows")?;
    populate_follows(pool, follows).await
}

/// Get the users `user_id` follows.
pub async fn find_followings(pool: &SqlitePool, user_id: i64) -> Result<Vec<FollowDisplay>> {
    let follows: Vec<Follow> =
        sqlx::query_as("SELECT * FROM follows WHERE user_following = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .context("Failed to fetch followings")?;
    populate_follows(pool, follows).await
}

/// Get the users following `user_id`.
pub async fn find_followers(pool: &SqlitePool, user_id: i64) -> Result<Vec<FollowDisplay>> {
    let follows: Vec<Follow> =
        sqlx::query_as("SELECT * FROM follows WHERE user_followed = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .context("Failed to fetch followers")?;
    populate_follows(pool, follows).await
}

/// Get the follow record of `follower` following `followed`, if any.
pub async fn find_follow(pool: &SqlitePool, follower: i64, followed: i64) -> Result<Option<Follow>> {
    sqlx::query_as("SELECT * FROM follows WHERE user_following = ? AND user_followed = ?")
        .bind(follower)
        .bind(followed)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch follow")
}

/// Make `follower` follow `followed`. Following twice keeps the first record.
pub async fn follow_user(pool: &SqlitePool, follower: i64, followed: i64) -> Result<Follow> {
    sqlx::query(
        r"
        INSERT INTO follows (user_following, user_followed) VALUES (?, ?)
        ON CONFLICT(user_following, user_followed) DO NOTHING
        ",
    )
    .bind(follower)
    .bind(followed)
    .execute(pool)
    .await
    .context("Failed to create follow")?;

    find_follow(pool, follower, followed)
        .await?
        .context("Follow missing after insert")
}

/// Remove the follow of `follower` on `followed`.
pub async fn unfollow_user(pool: &SqlitePool, follower: i64, followed: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM follows WHERE user_following = ? AND user_followed = ?")
        .bind(follower)
        .bind(followed)
        .execute(pool)
        .await
        .context("Failed to delete follow")?;
    Ok(result.rows_affected())
}

// ========== Bookmarks ==========

async fn populate_bookmarks(
    pool: &SqlitePool,
    bookmarks: Vec<Bookmark>,
    viewer: Option<i64>,
) -> Result<Vec<BookmarkDisplay>> {
    let tuit_ids = unique_ids(bookmarks.iter().map(|b| b.tuit_id));
    let user_ids = unique_ids(bookmarks.iter().map(|b| b.user_id));
    let tuits = get_tuits_display_by_ids(pool, &tuit_ids, viewer).await?;
    let users = get_users_by_ids(pool, &user_ids).await?;

    Ok(bookmarks
        .into_iter()
        .filter_map(|b| {
            Some(BookmarkDisplay {
                id: b.id,
                bookmarked_tuit: tuits.get(&b.tuit_id)?.clone(),
                bookmarked_by: users.get(&b.user_id)?.clone(),
            })
        })
        .collect())
}

/// Get every bookmark.
pub async fn find_all_bookmarks(
    pool: &SqlitePool,
    viewer: Option<i64>,
) -> Result<Vec<BookmarkDisplay>> {
    let bookmarks: Vec<Bookmark> = sqlx::query_as("SELECT * FROM bookmarks ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch bookmarks")?;
    populate_bookmarks(pool, bookmarks, viewer).await
}

/// Get the bookmarks a user made.
pub async fn find_bookmarks_by_user(
    pool: &SqlitePool,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<BookmarkDisplay>> {
    let bookmarks: Vec<Bookmark> =
        sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .context("Failed to fetch bookmarks by user")?;
    populate_bookmarks(pool, bookmarks, viewer).await
}

/// Get the bookmarks on a tuit.
pub async fn find_bookmarks_by_tuit(
    pool: &SqlitePool,
    tuit_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<BookmarkDisplay>> {
    let bookmarks: Vec<Bookmark> =
        sqlx::query_as("SELECT * FROM bookmarks WHERE tuit_id = ? ORDER BY id")
            .bind(tuit_id)
            .fetch_all(pool)
            .await
            .context("Failed to fetch bookmarks by tuit")?;
    populate_bookmarks(pool, bookmarks, viewer).await
}

/// Bookmark a tuit. Returns `None` if the tuit does not exist.
pub async fn bookmark_tuit(pool: &SqlitePool, user_id: i64, tuit_id: i64) -> Result<Option<Bookmark>> {
    sqlx::query(
        r"
        INSERT INTO bookmarks (user_id, tuit_id)
        SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM tuits WHERE id = ?2)
        ON CONFLICT(user_id, tuit_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(tuit_id)
    .execute(pool)
    .await
    .context("Failed to create bookmark")?;

    sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = ? AND tuit_id = ?")
        .bind(user_id)
        .bind(tuit_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch bookmark")
}

/// Remove a bookmark.
pub async fn unbookmark_tuit(pool: &SqlitePool, user_id: i64, tuit_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = ? AND tuit_id = ?")
        .bind(user_id)
        .bind(tuit_id)
        .execute(pool)
        .await
        .context("Failed to delete bookmark")?;
    Ok(result.rows_affected())
}

// ========== Messages ==========

/// Get the messages a user sent.
pub async fn find_sent_messages(pool: &SqlitePool, user_id: i64) -> Result<Vec<Message>> {
    sqlx::query_as("SELECT * FROM messages WHERE from_user = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch sent messages")
}

/// Get the messages a user received.
pub async fn find_received_messages(pool: &SqlitePool, user_id: i64) -> Result<Vec<Message>> {
    sqlx::query_as("SELECT * FROM messages WHERE to_user = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch received messages")
}

/// Get the messages `from` sent to `to`.
pub async fn find_messages_between(pool: &SqlitePool, from: i64, to: i64) -> Result<Vec<Message>> {
    sqlx::query_as("SELECT * FROM messages WHERE from_user = ? AND to_user = ? ORDER BY id")
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
        .context("Failed to fetch messages between users")
}

/// Send a message.
pub async fn send_message(pool: &SqlitePool, from: i64, to: i64, message: &str) -> Result<Message> {
    sqlx::query_as("INSERT INTO messages (message, from_user, to_user) VALUES (?, ?, ?) RETURNING *")
        .bind(message)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
        .context("Failed to create message")
}

/// Delete a message.
pub async fn delete_message(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete message")?;
    Ok(result.rows_affected())
}

/// Delete every message.
pub async fn delete_all_messages(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM messages")
        .execute(pool)
        .await
        .context("Failed to delete all messages")?;
    Ok(result.rows_affected())
}

// ========== Images ==========

pub async fn find_all_images(pool: &SqlitePool) -> Result<Vec<Image>> {
    sqlx::query_as("SELECT * FROM images ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to fetch images")
}

pub async fn find_image(pool: &SqlitePool, id: i64) -> Result<Option<Image>> {
    sqlx::query_as("SELECT * FROM images WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch image by ID")
}

pub async fn find_images_by_tuit(pool: &SqlitePool, tuit_id: i64) -> Result<Vec<Image>> {
    sqlx::query_as("SELECT * FROM images WHERE attached_by = ? ORDER BY id")
        .bind(tuit_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch images by tuit")
}

/// Attach an image to a tuit. Returns `None` if the tuit does not exist.
pub async fn attach_image(pool: &SqlitePool, tuit_id: i64, image: &str) -> Result<Option<Image>> {
    sqlx::query_as(
        r"
        INSERT INTO images (attached_by, image)
        SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM tuits WHERE id = ?1)
        RETURNING *
        ",
    )
    .bind(tuit_id)
    .bind(image)
    .fetch_optional(pool)
    .await
    .context("Failed to attach image")
}

pub async fn delete_image(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM images WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete image")?;
    Ok(result.rows_affected())
}

pub async fn delete_images_by_tuit(pool: &SqlitePool, tuit_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM images WHERE attached_by = ?")
        .bind(tuit_id)
        .execute(pool)
        .await
        .context("Failed to delete images by tuit")?;
    Ok(result.rows_affected())
}
