//! Metadata cache over a generic key-value store
//!
//! Two namespaces:
//! - strict: `meta:strict:{uri}:{modified_at}`, valid only while the source's
//!   modification time matches exactly
//! - loose: `meta:loose:{uri}`, for sources that report no modification time
//!
//! Entries are overwritten on every successful extraction and never evicted.

use cadence_core::{CadenceError, KeyValueStore, SongMetadata};
use std::sync::Arc;

pub const STRICT_PREFIX: &str = "meta:strict:";
pub const LOOSE_PREFIX: &str = "meta:loose:";

pub fn strict_key(uri: &str, modified_at: i64) -> String {
    format!("{STRICT_PREFIX}{uri}:{modified_at}")
}

pub fn loose_key(uri: &str) -> String {
    format!("{LOOSE_PREFIX}{uri}")
}

/// Typed view over the cache namespaces of a key-value store
#[derive(Clone)]
pub struct MetadataCache {
    kv: Arc<dyn KeyValueStore>,
}

impl MetadataCache {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Look up by `(uri, modified_at)`
    pub async fn get_strict(
        &self,
        uri: &str,
        modified_at: i64,
    ) -> cadence_core::Result<Option<SongMetadata>> {
        self.get(&strict_key(uri, modified_at)).await
    }

    /// Look up by `uri` alone
    pub async fn get_loose(&self, uri: &str) -> cadence_core::Result<Option<SongMetadata>> {
        self.get(&loose_key(uri)).await
    }

    /// Store under the strict key when a modification time is known, else loose
    pub async fn put(
        &self,
        uri: &str,
        modified_at: Option<i64>,
        metadata: &SongMetadata,
    ) -> cadence_core::Result<()> {
        let key = match modified_at {
            Some(m) => strict_key(uri, m),
            None => loose_key(uri),
        };
        let raw = serde_json::to_string(metadata)?;
        self.kv.set(&key, &raw).await
    }

    /// A blob that fails to decode counts as a miss and will be overwritten
    async fn get(&self, key: &str) -> cadence_core::Result<Option<SongMetadata>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                let err = CadenceError::cache_corruption(key, e.to_string());
                tracing::warn!("{}; re-extracting", err);
                Ok(None)
            }
        }
    }
}
