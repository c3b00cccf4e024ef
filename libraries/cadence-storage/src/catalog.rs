//! `CatalogStore` backed by the `songs` and `favorites` slices

use async_trait::async_trait;
use cadence_core::types::{Song, SongId};
use cadence_core::CatalogStore;
use sqlx::SqlitePool;

use crate::{favorites, songs};

/// Durable catalog over a `SQLite` pool
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for queries outside the trait surface
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn all_songs(&self) -> cadence_core::Result<Vec<Song>> {
        Ok(songs::get_all(&self.pool).await?)
    }

    async fn insert_song(&self, song: &Song) -> cadence_core::Result<()> {
        Ok(songs::insert(&self.pool, song).await?)
    }

    async fn update_song(&self, song: &Song) -> cadence_core::Result<()> {
        Ok(songs::update(&self.pool, song).await?)
    }

    async fn delete_song(&self, id: &SongId) -> cadence_core::Result<bool> {
        Ok(songs::delete(&self.pool, id).await?)
    }

    async fn set_favorite(&self, id: &SongId, favorite: bool) -> cadence_core::Result<()> {
        if favorite {
            favorites::add(&self.pool, id).await?;
        } else {
            favorites::remove(&self.pool, id).await?;
        }
        Ok(())
    }

    async fn favorites(&self) -> cadence_core::Result<Vec<SongId>> {
        Ok(favorites::get_all(&self.pool).await?)
    }

    async fn set_lyrics(
        &self,
        id: &SongId,
        lyrics: Option<&str>,
        synced_lyrics: Option<&str>,
    ) -> cadence_core::Result<()> {
        Ok(songs::set_lyrics(&self.pool, id, lyrics, synced_lyrics).await?)
    }
}
