//! Cache-first metadata extraction for a single uri

use crate::cache::MetadataCache;
use cadence_artwork::CoverArtStore;
use cadence_core::{CadenceError, MetadataParser, SongMetadata, StorageAccess};
use std::sync::Arc;

/// Where an extraction result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    StrictCache,
    LooseCache,
    Parsed,
}

/// Metadata for one uri plus how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub metadata: SongMetadata,
    pub source: ExtractionSource,
}

impl Extraction {
    pub fn from_cache(&self) -> bool {
        self.source != ExtractionSource::Parsed
    }
}

/// Extracts tags for a uri, consulting the cache before the parser
pub struct MetadataExtractor {
    access: Arc<dyn StorageAccess>,
    parser: Arc<dyn MetadataParser>,
    cache: MetadataCache,
    covers: Arc<CoverArtStore>,
}

impl MetadataExtractor {
    pub fn new(
        access: Arc<dyn StorageAccess>,
        parser: Arc<dyn MetadataParser>,
        cache: MetadataCache,
        covers: Arc<CoverArtStore>,
    ) -> Self {
        Self {
            access,
            parser,
            cache,
            covers,
        }
    }

    /// Extract metadata for `uri`
    ///
    /// 1. strict cache hit on `(uri, modified_at)` returns without parsing
    /// 2. with no modification time available, a loose hit on `uri` does the same
    /// 3. otherwise the bytes are read and parsed, the first picture goes to
    ///    the cover store, and the result is written back to the cache
    ///
    /// # Errors
    /// `NotFound` when the uri is gone, `ParseFailure` for unreadable tags
    pub async fn extract(&self, uri: &str) -> cadence_core::Result<Extraction> {
        let stat = self.access.stat(uri).await?;
        if !stat.exists {
            return Err(CadenceError::not_found(uri));
        }

        match stat.modified_at {
            Some(modified_at) => {
                if let Some(metadata) = self.cache.get_strict(uri, modified_at).await? {
                    tracing::debug!("Strict cache hit for {}", uri);
                    return Ok(Extraction {
                        metadata,
                        source: ExtractionSource::StrictCache,
                    });
                }
            }
            None => {
                if let Some(metadata) = self.cache.get_loose(uri).await? {
                    tracing::debug!("Loose cache hit for {}", uri);
                    return Ok(Extraction {
                        metadata,
                        source: ExtractionSource::LooseCache,
                    });
                }
            }
        }

        // The source may be a content-provider reference, so work from a local
        // in-memory copy rather than handing the uri to the parser.
        let bytes = self.access.read(uri).await?;

        let parser = Arc::clone(&self.parser);
        let tags = tokio::task::spawn_blocking(move || parser.parse(&bytes))
            .await
            .map_err(|e| CadenceError::Other(format!("parser task failed: {e}")))?
            .map_err(|e| match e {
                CadenceError::ParseFailure { reason, .. } => CadenceError::parse_failure(uri, reason),
                other => other,
            })?;

        let cover_art = match tags.pictures.first() {
            Some(picture) => self.store_cover(uri, tags.album.clone(), picture.clone()).await,
            None => None,
        };

        let metadata = SongMetadata {
            title: tags.title,
            artist: tags.artist,
            album: tags.album,
            year: tags.year,
            duration_seconds: tags.duration_seconds.max(0.0),
            cover_art,
            lyrics: tags.lyrics,
            modified_at: stat.modified_at,
        };

        if let Err(e) = self.cache.put(uri, stat.modified_at, &metadata).await {
            tracing::warn!("Failed to cache metadata for {}: {}", uri, e);
        }

        Ok(Extraction {
            metadata,
            source: ExtractionSource::Parsed,
        })
    }

    /// Cached metadata for `uri` at `modified_at`, without reading the source
    pub async fn cached(
        &self,
        uri: &str,
        modified_at: Option<i64>,
    ) -> cadence_core::Result<Option<SongMetadata>> {
        match modified_at {
            Some(modified_at) => self.cache.get_strict(uri, modified_at).await,
            None => self.cache.get_loose(uri).await,
        }
    }

    /// Cover failures never fail the extraction
    async fn store_cover(&self, uri: &str, album: Option<String>, picture: Vec<u8>) -> Option<String> {
        let covers = Arc::clone(&self.covers);
        let stored =
            tokio::task::spawn_blocking(move || covers.store(album.as_deref(), &picture)).await;

        match stored {
            Ok(Ok(path)) => Some(path.to_string_lossy().into_owned()),
            Ok(Err(e)) => {
                tracing::warn!("Skipping cover for {}: {}", uri, e);
                None
            }
            Err(e) => {
                tracing::warn!("Cover task for {} failed: {}", uri, e);
                None
            }
        }
    }
}
