//! In-memory catalog snapshot
//!
//! Every entry is an `Arc<Song>` and every write swaps a whole record, so a
//! reader holding an entry never observes a half-updated song.

use cadence_core::{Song, SongId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Entries {
    by_id: HashMap<SongId, Arc<Song>>,
    by_uri: HashMap<String, SongId>,
}

/// The running catalog, shared between the reconciler, its workers and readers
#[derive(Default)]
pub struct CatalogSnapshot {
    entries: RwLock<Entries>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot
    pub fn replace_all(&self, songs: Vec<Song>) {
        let mut entries = Entries::default();
        for song in songs {
            entries.by_uri.insert(song.uri.clone(), song.id.clone());
            entries.by_id.insert(song.id.clone(), Arc::new(song));
        }
        *self.write() = entries;
    }

    /// Insert or replace by id
    pub fn upsert(&self, song: Song) {
        let mut entries = self.write();
        let stale_uri = entries
            .by_id
            .get(&song.id)
            .filter(|previous| previous.uri != song.uri)
            .map(|previous| previous.uri.clone());
        if let Some(stale_uri) = stale_uri {
            entries.by_uri.remove(&stale_uri);
        }
        entries.by_uri.insert(song.uri.clone(), song.id.clone());
        entries.by_id.insert(song.id.clone(), Arc::new(song));
    }

    /// Replace an existing entry. Returns false if the id was removed meanwhile.
    pub fn upgrade(&self, song: Song) -> bool {
        let mut entries = self.write();
        match entries.by_id.get_mut(&song.id) {
            Some(slot) => {
                *slot = Arc::new(song);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &SongId) -> Option<Arc<Song>> {
        let mut entries = self.write();
        let removed = entries.by_id.remove(id)?;
        entries.by_uri.remove(&removed.uri);
        Some(removed)
    }

    pub fn get(&self, id: &SongId) -> Option<Arc<Song>> {
        self.read().by_id.get(id).cloned()
    }

    pub fn get_by_uri(&self, uri: &str) -> Option<Arc<Song>> {
        let entries = self.read();
        let id = entries.by_uri.get(uri)?;
        entries.by_id.get(id).cloned()
    }

    pub fn contains_uri(&self, uri: &str) -> bool {
        self.read().by_uri.contains_key(uri)
    }

    pub fn uris(&self) -> HashSet<String> {
        self.read().by_uri.keys().cloned().collect()
    }

    /// Every song, ordered by title (case-insensitive) then id
    pub fn all(&self) -> Vec<Arc<Song>> {
        let mut songs: Vec<_> = self.read().by_id.values().cloned().collect();
        sort_for_display(&mut songs);
        songs
    }

    /// Case-insensitive substring match over title, artist and album
    pub fn search(&self, query: &str) -> Vec<Arc<Song>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.all();
        }

        let matches = |field: Option<&str>| {
            field
                .map(|f| f.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };

        let mut songs: Vec<_> = self
            .read()
            .by_id
            .values()
            .filter(|s| {
                matches(Some(&s.title)) || matches(s.artist.as_deref()) || matches(s.album.as_deref())
            })
            .cloned()
            .collect();
        sort_for_display(&mut songs);
        songs
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().by_id.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sort_for_display(songs: &mut [Arc<Song>]) {
    songs.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::SongMetadata;

    fn song(id: &str, uri: &str) -> Song {
        Song::placeholder(SongId::new(id), uri, 1, Some(1))
    }

    #[test]
    fn lookups_by_id_and_uri() {
        let snapshot = CatalogSnapshot::new();
        snapshot.upsert(song("1", "/m/a.mp3"));

        assert_eq!(snapshot.get(&SongId::new("1")).unwrap().uri, "/m/a.mp3");
        assert_eq!(snapshot.get_by_uri("/m/a.mp3").unwrap().id, SongId::new("1"));
        assert!(snapshot.contains_uri("/m/a.mp3"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn upgrade_ignores_removed_ids() {
        let snapshot = CatalogSnapshot::new();
        let placeholder = song("1", "/m/a.mp3");
        snapshot.upsert(placeholder.clone());

        let reader_copy = snapshot.get(&placeholder.id).unwrap();
        let upgraded = placeholder.with_metadata(&SongMetadata {
            title: Some("Upgraded".into()),
            ..SongMetadata::default()
        });
        assert!(snapshot.upgrade(upgraded.clone()));

        // Readers keep the record they already hold
        assert_eq!(reader_copy.title, "a");
        assert_eq!(snapshot.get(&placeholder.id).unwrap().title, "Upgraded");

        snapshot.remove(&placeholder.id);
        assert!(!snapshot.upgrade(upgraded));
        assert!(snapshot.is_empty());
        assert!(!snapshot.contains_uri("/m/a.mp3"));
    }

    #[test]
    fn search_matches_any_text_field() {
        let snapshot = CatalogSnapshot::new();
        let mut with_artist = song("1", "/m/one.mp3");
        with_artist.artist = Some("The Quiet Ones".into());
        snapshot.upsert(with_artist);
        snapshot.upsert(song("2", "/m/quietly.mp3"));
        snapshot.upsert(song("3", "/m/loud.mp3"));

        let hits: Vec<_> = snapshot.search("QUIET").iter().map(|s| s.id.clone()).collect();
        assert_eq!(hits, vec![SongId::new("1"), SongId::new("2")]);
        assert_eq!(snapshot.search("  ").len(), 3);
    }
}
