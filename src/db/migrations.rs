use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Run all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    create_migration_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version < 1 {
        debug!("Running migration v1");
        run_migration_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if current_version < 2 {
        debug!("Running migration v2");
        run_migration_v2(pool).await?;
        set_schema_version(pool, 2).await?;
    }

    if current_version < 3 {
        debug!("Running migration v3");
        run_migration_v3(pool).await?;
        set_schema_version(pool, 3).await?;
    }

    Ok(())
}

async fn create_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schema version table")?;

    Ok(())
}

async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM _schema_version LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to get schema version")?;

    Ok(row.map_or(0, |(v,)| v))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("DELETE FROM _schema_version")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO _schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

async fn run_migration_v1(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v1: creating users and sessions");

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            first_name TEXT,
            last_name TEXT,
            profile_photo TEXT,
            header_image TEXT,
            account_type TEXT NOT NULL DEFAULT 'PERSONAL',
            marital_status TEXT,
            biography TEXT,
            date_of_birth TEXT,
            joined TEXT NOT NULL DEFAULT (datetime('now')),
            latitude REAL,
            longitude REAL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    // expires_at uses the datetime('now') text format so it compares in SQL
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            last_used_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn run_migration_v2(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v2: creating tuits and their relations");

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS tuits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tuit TEXT NOT NULL,
            posted_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            posted_on TEXT NOT NULL DEFAULT (datetime('now')),
            image TEXT,
            youtube TEXT,
            replies INTEGER NOT NULL DEFAULT 0,
            retuits INTEGER NOT NULL DEFAULT 0,
            likes INTEGER NOT NULL DEFAULT 0,
            dislikes INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create tuits table")?;

    // One like and one dislike per (user, tuit); tuits.likes/dislikes are recounted from these
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS likes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            tuit_id INTEGER NOT NULL REFERENCES tuits(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, tuit_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create likes table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS dislikes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            tuit_id INTEGER NOT NULL REFERENCES tuits(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, tuit_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create dislikes table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            tuit_id INTEGER NOT NULL REFERENCES tuits(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, tuit_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create bookmarks table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS follows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_following INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            user_followed INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            followed_on TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_following, user_followed)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create follows table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            from_user INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            to_user INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            sent_on TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create messages table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            attached_by INTEGER NOT NULL REFERENCES tuits(id) ON DELETE CASCADE,
            image TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create images table")?;

    // Indexes for foreign-key lookups
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tuits_posted_by ON tuits(posted_by)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_likes_tuit_id ON likes(tuit_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_dislikes_tuit_id ON dislikes(tuit_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookmarks_tuit_id ON bookmarks(tuit_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_follows_user_followed ON follows(user_followed)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_from_user ON messages(from_user)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_to_user ON messages(to_user)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_images_attached_by ON images(attached_by)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn run_migration_v3(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v3: creating movies, reviews, acts and watchlist");

    // imdb_id is nullable; SQLite allows many NULLs under UNIQUE
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            imdb_id TEXT UNIQUE,
            poster TEXT,
            rating REAL NOT NULL DEFAULT 0,
            likes INTEGER NOT NULL DEFAULT 0,
            dislikes INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create movies table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            review TEXT NOT NULL DEFAULT '',
            from_user INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            to_movie INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            posted_on TEXT NOT NULL DEFAULT (datetime('now')),
            rating REAL NOT NULL DEFAULT 0,
            replies INTEGER NOT NULL DEFAULT 0,
            reposts INTEGER NOT NULL DEFAULT 0,
            likes INTEGER NOT NULL DEFAULT 0,
            dislikes INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create reviews table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS acts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            acted_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            UNIQUE(acted_by, movie_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create acts table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS watchlist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            added_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, movie_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create watchlist table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_from_user ON reviews(from_user)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_to_movie ON reviews(to_movie)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_acts_movie_id ON acts(movie_id)")
        .execute(pool)
        .await?;

    Ok(())
}
