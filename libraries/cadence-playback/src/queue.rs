//! Playback queue
//!
//! An ordered list of songs plus the context it was built from. Positions
//! are derived from song ids on demand and never stored.

use cadence_core::{QueueContext, Song, SongId};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    songs: Vec<Arc<Song>>,
    context: QueueContext,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue wholesale
    pub fn replace(&mut self, songs: Vec<Arc<Song>>, context: QueueContext) {
        self.songs = songs;
        self.context = context;
    }

    /// Append songs, retagging the queue with `context`
    pub fn append(&mut self, songs: Vec<Arc<Song>>, context: QueueContext) {
        self.songs.extend(songs);
        self.context = context;
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Song>> {
        self.songs.get(index)
    }

    /// Position of a song in the queue
    pub fn position_of(&self, id: &SongId) -> Option<usize> {
        self.songs.iter().position(|song| &song.id == id)
    }

    pub fn find(&self, id: &SongId) -> Option<&Arc<Song>> {
        self.songs.iter().find(|song| &song.id == id)
    }

    pub fn find_by_uri(&self, uri: &str) -> Option<&Arc<Song>> {
        self.songs.iter().find(|song| song.uri == uri)
    }

    /// Swap in a refreshed record for every entry with the same id
    pub fn refresh(&mut self, song: &Arc<Song>) {
        for slot in self.songs.iter_mut().filter(|s| s.id == song.id) {
            *slot = Arc::clone(song);
        }
    }

    pub fn songs(&self) -> &[Arc<Song>] {
        &self.songs
    }

    pub fn ids(&self) -> Vec<SongId> {
        self.songs.iter().map(|song| song.id.clone()).collect()
    }

    pub fn context(&self) -> QueueContext {
        self.context
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
