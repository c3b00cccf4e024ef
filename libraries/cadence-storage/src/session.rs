//! Session snapshot persistence over a key-value store

use async_trait::async_trait;
use cadence_core::types::Session;
use cadence_core::{KeyValueStore, SessionPersistence};
use std::sync::Arc;

/// Key under which the snapshot is stored
pub const SESSION_KEY: &str = "session";

/// Stores the playback session as a JSON document
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Drop the stored snapshot
    pub async fn clear(&self) -> cadence_core::Result<()> {
        self.kv.remove(SESSION_KEY).await
    }
}

#[async_trait]
impl SessionPersistence for SessionStore {
    /// A snapshot that no longer decodes is logged and treated as absent
    async fn load(&self) -> cadence_core::Result<Option<Session>> {
        let Some(raw) = self.kv.get(SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session snapshot: {}", e);
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> cadence_core::Result<()> {
        let raw = serde_json::to_string(session)?;
        self.kv.set(SESSION_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyValueStore;
    use cadence_core::types::{RepeatMode, SongId};

    #[tokio::test]
    async fn save_then_load() {
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        assert!(store.load().await.unwrap().is_none());

        let mut session = Session::default();
        session.current_song_id = Some(SongId::new("a"));
        session.repeat = RepeatMode::One;
        session.volume = 0.4;
        store.save(&session).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn corrupt_snapshot_loads_as_absent() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(SESSION_KEY, "{not json").await.unwrap();

        let store = SessionStore::new(kv);
        assert!(store.load().await.unwrap().is_none());
    }
}
