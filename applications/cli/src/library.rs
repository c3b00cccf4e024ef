//! Long-lived services behind the CLI commands

use crate::config::CadenceConfig;
use crate::error::Result;
use cadence_artwork::CoverArtStore;
use cadence_core::KeyValueStore;
use cadence_metadata::{LoftyParser, MetadataCache, MetadataExtractor};
use cadence_playback::PlaybackEngine;
use cadence_storage::{SessionStore, SqliteCatalog, SqliteKeyValueStore};
use cadence_sync::{LocalFolder, Reconciler};
use std::sync::Arc;

/// Recently derived cover paths kept in memory
const COVER_CACHE_SIZE: usize = 256;

/// Catalog, reconciler and session store over one database
pub struct Library {
    pub catalog: Arc<SqliteCatalog>,
    pub reconciler: Reconciler,
    kv: Arc<dyn KeyValueStore>,
    config: CadenceConfig,
}

impl Library {
    /// Open the database, apply migrations and build the reconciler
    pub async fn open(config: &CadenceConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.storage.cache_dir).await?;
        ensure_database_dir(&config.storage.database_url).await?;

        let pool = cadence_storage::create_pool(&config.storage.database_url).await?;
        cadence_storage::run_migrations(&pool).await?;
        tracing::debug!("Database ready at {}", config.storage.database_url);

        let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));

        let access = Arc::new(LocalFolder::new());
        let extractor = MetadataExtractor::new(
            access.clone(),
            Arc::new(LoftyParser::new()),
            MetadataCache::new(Arc::clone(&kv)),
            Arc::new(CoverArtStore::new(config.covers_dir(), COVER_CACHE_SIZE)?),
        );

        let reconciler = Reconciler::new(
            access,
            catalog.clone(),
            Arc::new(extractor),
            config.sync_config(),
        );

        Ok(Self {
            catalog,
            reconciler,
            kv,
            config: config.clone(),
        })
    }

    /// A transport-less engine restored from the stored session
    pub async fn engine(&self) -> Result<PlaybackEngine> {
        self.reconciler.load_catalog().await?;

        let persistence = Arc::new(SessionStore::new(Arc::clone(&self.kv)));
        let mut engine = PlaybackEngine::new(self.config.engine_config(), persistence)
            .with_catalog(self.catalog.clone());
        engine.load_session(self.reconciler.snapshot().all()).await?;

        Ok(engine)
    }
}

/// sqlite creates the file but not its parent directory
async fn ensure_database_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .filter(|path| !path.starts_with(':'));

    if let Some(parent) = path.and_then(|p| std::path::Path::new(p).parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}
