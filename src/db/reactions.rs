//! Likes and dislikes on tuits.
//!
//! `tuits.likes` and `tuits.dislikes` cache the number of rows in the `likes`
//! and `dislikes` tables. Every write here recounts the affected tuits inside
//! the same transaction that changed the join rows, and the transaction's
//! first statement is a write so SQLite hands it the write lock before any
//! read happens.

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};

use super::models::{ReactionDisplay, ReactionRecord, ToggleOutcome};
use super::queries::{get_tuits_display_by_ids, get_users_by_ids, unique_ids};

/// Which join table a reaction lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// Join table holding the records. Also the name of the counter column on `tuits`.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Like => "likes",
            Self::Dislike => "dislikes",
        }
    }
}

/// Set one counter on one tuit from its join rows, returning the new value.
async fn recount_reaction(
    conn: &mut SqliteConnection,
    reaction: Reaction,
    tuit_id: i64,
) -> Result<i64> {
    let table = reaction.table();
    let query = format!(
        "UPDATE tuits SET {table} = (SELECT COUNT(*) FROM {table} WHERE tuit_id = ?1) WHERE id = ?1 RETURNING {table}"
    );
    let row: (i64,) = sqlx::query_as(&query)
        .bind(tuit_id)
        .fetch_one(conn)
        .await
        .with_context(|| format!("Failed to recount {table} for tuit {tuit_id}"))?;
    Ok(row.0)
}

/// Recount both counters on every tuit `user_id` reacted to, leaving out that
/// user's own records. Runs before the user row is deleted, while the join
/// rows still say which tuits are affected.
pub(super) async fn recount_tuits_reacted_by(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<()> {
    sqlx::query(
        r"
        UPDATE tuits SET
            likes = (SELECT COUNT(*) FROM likes
                     WHERE likes.tuit_id = tuits.id AND likes.user_id != ?1),
            dislikes = (SELECT COUNT(*) FROM dislikes
                        WHERE dislikes.tuit_id = tuits.id AND dislikes.user_id != ?1)
        WHERE id IN (
            SELECT tuit_id FROM likes WHERE user_id = ?1
            UNION
            SELECT tuit_id FROM dislikes WHERE user_id = ?1
        )
        ",
    )
    .bind(user_id)
    .execute(conn)
    .await
    .context("Failed to recount tuit stats")?;
    Ok(())
}

async fn tuit_exists(conn: &mut SqliteConnection, tuit_id: i64) -> Result<bool> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM tuits WHERE id = ?)")
        .bind(tuit_id)
        .fetch_one(conn)
        .await
        .context("Failed to check tuit existence")?;
    Ok(row.0)
}

async fn insert_reaction(
    conn: &mut SqliteConnection,
    reaction: Reaction,
    user_id: i64,
    tuit_id: i64,
) -> Result<()> {
    let query = format!(
        r"
        INSERT INTO {} (user_id, tuit_id)
        SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM tuits WHERE id = ?2)
        ON CONFLICT(user_id, tuit_id) DO NOTHING
        ",
        reaction.table()
    );
    sqlx::query(&query)
        .bind(user_id)
        .bind(tuit_id)
        .execute(conn)
        .await
        .with_context(|| format!("Failed to insert into {}", reaction.table()))?;
    Ok(())
}

/// Flip the user's reaction on a tuit and bring the tuit's counter in line.
///
/// Returns `None` if the tuit does not exist. Nothing is written in that case.
pub async fn toggle_reaction(
    pool: &SqlitePool,
    reaction: Reaction,
    user_id: i64,
    tuit_id: i64,
) -> Result<Option<ToggleOutcome>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin toggle transaction")?;

    let query = format!(
        "DELETE FROM {} WHERE user_id = ? AND tuit_id = ?",
        reaction.table()
    );
    let removed = sqlx::query(&query)
        .bind(user_id)
        .bind(tuit_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete reaction")?
        .rows_affected()
        > 0;

    if !tuit_exists(&mut tx, tuit_id).await? {
        return Ok(None);
    }

    if !removed {
        insert_reaction(&mut tx, reaction, user_id, tuit_id).await?;
    }

    let count = recount_reaction(&mut tx, reaction, tuit_id).await?;

    tx.commit().await.context("Failed to commit toggle")?;

    Ok(Some(ToggleOutcome {
        active: !removed,
        count,
    }))
}

/// Add the user's reaction to a tuit. Adding twice keeps one record.
///
/// Returns `None` if the tuit does not exist.
pub async fn add_reaction(
    pool: &SqlitePool,
    reaction: Reaction,
    user_id: i64,
    tuit_id: i64,
) -> Result<Option<ReactionRecord>> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin reaction transaction")?;

    insert_reaction(&mut tx, reaction, user_id, tuit_id).await?;

    let query = format!(
        "SELECT * FROM {} WHERE user_id = ? AND tuit_id = ?",
        reaction.table()
    );
    let record: Option<ReactionRecord> = sqlx::query_as(&query)
        .bind(user_id)
        .bind(tuit_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch reaction")?;

    let Some(record) = record else {
        return Ok(None);
    };

    recount_reaction(&mut tx, reaction, tuit_id).await?;
    tx.commit().await.context("Failed to commit reaction")?;

    Ok(Some(record))
}

/// Remove the user's reaction from a tuit, returning how many records were deleted.
pub async fn remove_reaction(
    pool: &SqlitePool,
    reaction: Reaction,
    user_id: i64,
    tuit_id: i64,
) -> Result<u64> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin reaction transaction")?;

    let query = format!(
        "DELETE FROM {} WHERE user_id = ? AND tuit_id = ?",
        reaction.table()
    );
    let deleted = sqlx::query(&query)
        .bind(user_id)
        .bind(tuit_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete reaction")?
        .rows_affected();

    if deleted > 0 {
        recount_reaction(&mut tx, reaction, tuit_id).await?;
    }
    tx.commit().await.context("Failed to commit reaction")?;

    Ok(deleted)
}

/// Delete every record of this reaction and zero the matching counters.
pub async fn delete_all_reactions(pool: &SqlitePool, reaction: Reaction) -> Result<u64> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin reaction transaction")?;

    let table = reaction.table();
    let deleted = sqlx::query(&format!("DELETE FROM {table}"))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to delete all {table}"))?
        .rows_affected();

    sqlx::query(&format!("UPDATE tuits SET {table} = 0 WHERE {table} != 0"))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to reset {table} counters"))?;

    tx.commit().await.context("Failed to commit reaction")?;

    Ok(deleted)
}

/// Get a single reaction record.
pub async fn find_reaction(
    pool: &SqlitePool,
    reaction: Reaction,
    user_id: i64,
    tuit_id: i64,
) -> Result<Option<ReactionRecord>> {
    let query = format!(
        "SELECT * FROM {} WHERE user_id = ? AND tuit_id = ?",
        reaction.table()
    );
    sqlx::query_as(&query)
        .bind(user_id)
        .bind(tuit_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch reaction")
}

/// Count the records of this reaction on a tuit.
pub async fn count_reactions(pool: &SqlitePool, reaction: Reaction, tuit_id: i64) -> Result<i64> {
    let query = format!(
        "SELECT COUNT(*) FROM {} WHERE tuit_id = ?",
        reaction.table()
    );
    let row: (i64,) = sqlx::query_as(&query)
        .bind(tuit_id)
        .fetch_one(pool)
        .await
        .context("Failed to count reactions")?;
    Ok(row.0)
}

async fn populate_reactions(
    pool: &SqlitePool,
    records: Vec<ReactionRecord>,
    viewer: Option<i64>,
) -> Result<Vec<ReactionDisplay>> {
    let tuit_ids = unique_ids(records.iter().map(|r| r.tuit_id));
    let user_ids = unique_ids(records.iter().map(|r| r.user_id));
    let tuits = get_tuits_display_by_ids(pool, &tuit_ids, viewer).await?;
    let users = get_users_by_ids(pool, &user_ids).await?;

    Ok(records
        .into_iter()
        .filter_map(|r| {
            Some(ReactionDisplay {
                id: r.id,
                tuit: tuits.get(&r.tuit_id)?.clone(),
                user: users.get(&r.user_id)?.clone(),
            })
        })
        .collect())
}

/// Get the tuits a user reacted to, with both sides populated.
pub async fn find_reactions_by_user(
    pool: &SqlitePool,
    reaction: Reaction,
    user_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<ReactionDisplay>> {
    let query = format!(
        "SELECT * FROM {} WHERE user_id = ? ORDER BY id",
        reaction.table()
    );
    let records: Vec<ReactionRecord> = sqlx::query_as(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch reactions by user")?;
    populate_reactions(pool, records, viewer).await
}

/// Get the users who reacted to a tuit, with both sides populated.
pub async fn find_reactions_by_tuit(
    pool: &SqlitePool,
    reaction: Reaction,
    tuit_id: i64,
    viewer: Option<i64>,
) -> Result<Vec<ReactionDisplay>> {
    let query = format!(
        "SELECT * FROM {} WHERE tuit_id = ? ORDER BY id",
        reaction.table()
    );
    let records: Vec<ReactionRecord> = sqlx::query_as(&query)
        .bind(tuit_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch reactions by tuit")?;
    populate_reactions(pool, records, viewer).await
}
