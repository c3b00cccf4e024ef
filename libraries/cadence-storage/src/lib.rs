//! Cadence Storage
//!
//! `SQLite` persistence for the song catalog, favorites, and the generic
//! key-value store that backs the session snapshot and metadata cache.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `songs`, `favorites` and `kv` each own their queries
//! - **Adapters**: `SqliteCatalog`, `SqliteKeyValueStore` and `SessionStore`
//!   implement the capability traits from `cadence-core`
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_storage::{create_pool, run_migrations, SqliteCatalog};
//! use cadence_core::CatalogStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db").await?;
//! run_migrations(&pool).await?;
//!
//! let catalog = SqliteCatalog::new(pool);
//! let songs = catalog.all_songs().await?;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;
mod session;

// Vertical slices
pub mod favorites;
pub mod kv;
pub mod songs;

pub use catalog::SqliteCatalog;
pub use error::{Result, StorageError};
pub use kv::{MemoryKeyValueStore, SqliteKeyValueStore};
pub use session::{SessionStore, SESSION_KEY};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before any store is used.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// Foreign keys are enabled on every connection so favorites cascade when a
/// song row is deleted.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cadence.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> std::result::Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool for {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
