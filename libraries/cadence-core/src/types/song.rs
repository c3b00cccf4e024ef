/// Song record and the extracted-metadata blob
use serde::{Deserialize, Serialize};

use super::SongId;

/// A catalog entry
///
/// `uri` is unique within the catalog and `id` never changes once assigned.
/// Placeholders carry only filename-derived fields until extraction upgrades
/// them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    /// Stable source identifier (path or content-provider reference)
    pub uri: String,
    pub filename: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub duration_seconds: f64,
    /// Path of a file in the cover art store
    pub cover_art: Option<String>,
    pub lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
    /// Last known modification time (ms since epoch)
    pub modified_at: Option<i64>,
    pub size: u64,
    /// Unix epoch seconds
    pub added_at: i64,
}

impl Song {
    /// Create a placeholder for a freshly discovered uri
    pub fn placeholder(
        id: SongId,
        uri: impl Into<String>,
        size: u64,
        modified_at: Option<i64>,
    ) -> Self {
        let uri = uri.into();
        let filename = filename_from_uri(&uri);
        let title = title_from_filename(&filename);

        Self {
            id,
            uri,
            filename,
            title,
            artist: None,
            album: None,
            year: None,
            duration_seconds: 0.0,
            cover_art: None,
            lyrics: None,
            synced_lyrics: None,
            modified_at,
            size,
            added_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Whether extraction has not yet filled in any tag data
    pub fn is_placeholder(&self) -> bool {
        self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
            && self.duration_seconds == 0.0
            && self.title == title_from_filename(&self.filename)
    }

    /// Return a copy upgraded with extracted metadata
    ///
    /// Identity fields (`id`, `uri`, `filename`, `size`, `added_at`) and
    /// user-entered lyrics survive; tag fields are replaced wholesale.
    pub fn with_metadata(&self, metadata: &SongMetadata) -> Self {
        Self {
            id: self.id.clone(),
            uri: self.uri.clone(),
            filename: self.filename.clone(),
            title: metadata
                .title
                .clone()
                .unwrap_or_else(|| title_from_filename(&self.filename)),
            artist: metadata.artist.clone(),
            album: metadata.album.clone(),
            year: metadata.year,
            duration_seconds: metadata.duration_seconds.max(0.0),
            cover_art: metadata.cover_art.clone(),
            lyrics: self.lyrics.clone().or_else(|| metadata.lyrics.clone()),
            synced_lyrics: self.synced_lyrics.clone(),
            modified_at: metadata.modified_at.or(self.modified_at),
            size: self.size,
            added_at: self.added_at,
        }
    }

    /// Artist for display, falling back to a fixed label
    pub fn display_artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown Artist")
    }
}

/// Metadata extracted from a single file, as stored in the metadata cache
///
/// Carries no identifier: the catalog owns ids, so re-extraction can never
/// change a song's identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub duration_seconds: f64,
    pub cover_art: Option<String>,
    pub lyrics: Option<String>,
    pub modified_at: Option<i64>,
}

/// Last path segment of a uri
pub fn filename_from_uri(uri: &str) -> String {
    uri.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(uri)
        .to_string()
}

/// Filename without its extension
pub fn title_from_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}
