//! Favorites association
//!
//! Each row references a song; deleting the song removes the row through
//! `ON DELETE CASCADE`.

use cadence_core::types::SongId;
use sqlx::{Row, SqlitePool};

use crate::error::Result;

/// Mark a song as favorite. Adding twice is a no-op.
pub async fn add(pool: &SqlitePool, id: &SongId) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO favorites (song_id, added_at) VALUES (?, ?)")
        .bind(id)
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove a song from favorites
pub async fn remove(pool: &SqlitePool, id: &SongId) -> Result<()> {
    sqlx::query("DELETE FROM favorites WHERE song_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All favorite song ids, oldest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<SongId>> {
    let rows = sqlx::query("SELECT song_id FROM favorites ORDER BY added_at, song_id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| row.get::<SongId, _>("song_id"))
        .collect())
}

/// Whether a song is a favorite
pub async fn is_favorite(pool: &SqlitePool, id: &SongId) -> Result<bool> {
    let row = sqlx::query("SELECT 1 AS hit FROM favorites WHERE song_id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
