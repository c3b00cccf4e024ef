//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! so migrations, foreign keys and unique constraints behave as in production.

#![allow(dead_code)]

use cadence_core::types::{Song, SongId};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = cadence_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        cadence_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: a placeholder song for `uri`
pub fn test_song(id: &str, uri: &str) -> Song {
    Song::placeholder(SongId::new(id), uri, 1024, Some(1_700_000_000_000))
}

/// Test fixture: insert a placeholder song
pub async fn insert_test_song(pool: &SqlitePool, id: &str, uri: &str) -> Song {
    let song = test_song(id, uri);
    cadence_storage::songs::insert(pool, &song)
        .await
        .expect("Failed to insert test song");
    song
}
