//! Song catalog queries
//!
//! Rows are keyed by the catalog-assigned id; `uri` carries a unique
//! constraint so a file can never be cataloged twice.

use cadence_core::types::{Song, SongId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{Result, StorageError};

const SELECT_COLUMNS: &str = "SELECT id, uri, filename, title, artist, album, duration, cover_art, \
     size, added_at, year, lyrics, synced_lyrics, modified_at FROM songs";

fn song_from_row(row: &SqliteRow) -> Song {
    Song {
        id: row.get::<SongId, _>("id"),
        uri: row.get("uri"),
        filename: row.get("filename"),
        title: row.get("title"),
        artist: row.get("artist"),
        album: row.get("album"),
        year: row.get::<Option<i64>, _>("year").map(|y| y as i32),
        duration_seconds: row.get("duration"),
        cover_art: row.get("cover_art"),
        lyrics: row.get("lyrics"),
        synced_lyrics: row.get("synced_lyrics"),
        modified_at: row.get("modified_at"),
        size: row.get::<i64, _>("size").max(0) as u64,
        added_at: row.get("added_at"),
    }
}

/// Get every song, ordered by title
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY title COLLATE NOCASE, id"))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(song_from_row).collect())
}

/// Get a song by id
pub async fn get_by_id(pool: &SqlitePool, id: &SongId) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(song_from_row))
}

/// Get a song by uri
pub async fn get_by_uri(pool: &SqlitePool, uri: &str) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE uri = ?"))
        .bind(uri)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(song_from_row))
}

/// Insert a new song
///
/// # Errors
///
/// Fails if the id or uri is already present
pub async fn insert(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        "INSERT INTO songs (id, uri, filename, title, artist, album, duration, cover_art, \
         size, added_at, year, lyrics, synced_lyrics, modified_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&song.id)
    .bind(&song.uri)
    .bind(&song.filename)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.album)
    .bind(song.duration_seconds)
    .bind(&song.cover_art)
    .bind(song.size as i64)
    .bind(song.added_at)
    .bind(song.year.map(i64::from))
    .bind(&song.lyrics)
    .bind(&song.synced_lyrics)
    .bind(song.modified_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace every mutable field of an existing song
///
/// `id`, `uri` and `added_at` are identity and never rewritten.
pub async fn update(pool: &SqlitePool, song: &Song) -> Result<()> {
    let result = sqlx::query(
        "UPDATE songs SET filename = ?, title = ?, artist = ?, album = ?, duration = ?, \
         cover_art = ?, size = ?, year = ?, lyrics = ?, synced_lyrics = ?, modified_at = ? \
         WHERE id = ?",
    )
    .bind(&song.filename)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.album)
    .bind(song.duration_seconds)
    .bind(&song.cover_art)
    .bind(song.size as i64)
    .bind(song.year.map(i64::from))
    .bind(&song.lyrics)
    .bind(&song.synced_lyrics)
    .bind(song.modified_at)
    .bind(&song.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Song", song.id.as_str()));
    }

    Ok(())
}

/// Set or clear the lyrics of a song
pub async fn set_lyrics(
    pool: &SqlitePool,
    id: &SongId,
    lyrics: Option<&str>,
    synced_lyrics: Option<&str>,
) -> Result<()> {
    let result = sqlx::query("UPDATE songs SET lyrics = ?, synced_lyrics = ? WHERE id = ?")
        .bind(lyrics)
        .bind(synced_lyrics)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Song", id.as_str()));
    }

    Ok(())
}

/// Delete a song. Favorites referencing it are removed by cascade.
///
/// Returns whether a row was deleted.
pub async fn delete(pool: &SqlitePool, id: &SongId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of songs in the catalog
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM songs")
        .fetch_one(pool)
        .await?;

    Ok(row.get("total"))
}
