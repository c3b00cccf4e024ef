//! Playback engine - queue and transport orchestration
//!
//! The engine is the single owner of the current song and the playing flag.
//! Transport calls complete before any dependent state (current id,
//! position, duration) is committed, so a failed load leaves the previous
//! state intact.

use crate::{
    error::{PlaybackError, Result},
    queue::Queue,
    shuffle::{random_index, shuffle_batch},
    types::{Direction, EngineConfig, PlaybackState},
};
use cadence_core::{
    parse_synced_lyrics, CadenceError, CatalogStore, LyricLine, QueueContext, RepeatMode, Session,
    SessionPersistence, Song, SongId, SongLyrics, Transport, TransportEvent,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Where `advance` lands before boundary handling
enum Target {
    Index(usize),
    PastEnd,
    BeforeStart,
}

pub struct PlaybackEngine {
    config: EngineConfig,
    transport: Option<Arc<dyn Transport>>,
    persistence: Arc<dyn SessionPersistence>,
    catalog: Option<Arc<dyn CatalogStore>>,

    queue: Queue,
    current: Option<Arc<Song>>,
    state: PlaybackState,
    /// Whether the transport is bound to `current`
    loaded: bool,
    position: f64,
    duration: f64,

    repeat: RepeatMode,
    shuffle: bool,
    favorites: BTreeSet<SongId>,
    volume: f32,
    lyrics: BTreeMap<SongId, SongLyrics>,

    last_auto_advance: Option<Instant>,
    last_persisted_position: f64,
}

impl PlaybackEngine {
    /// Create an idle engine with no transport bound
    pub fn new(config: EngineConfig, persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            config,
            transport: None,
            persistence,
            catalog: None,
            queue: Queue::new(),
            current: None,
            state: PlaybackState::Idle,
            loaded: false,
            position: 0.0,
            duration: 0.0,
            repeat: RepeatMode::Off,
            shuffle: false,
            favorites: BTreeSet::new(),
            volume: 1.0,
            lyrics: BTreeMap::new(),
            last_auto_advance: None,
            last_persisted_position: 0.0,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.set_transport(transport);
        self
    }

    /// Mirror favorites and lyrics edits into the catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogStore>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Bind (or rebind) the audio engine. The current song is reloaded on the next play.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
        self.loaded = false;
    }

    // ===== Queue =====

    /// Append songs to the queue
    ///
    /// With shuffle on, only the appended batch is permuted. With repeat
    /// one the queue is frozen and this does nothing.
    pub async fn enqueue(&mut self, songs: Vec<Arc<Song>>, context: QueueContext) {
        if self.repeat == RepeatMode::One {
            debug!("Ignoring enqueue of {} songs: repeat one", songs.len());
            return;
        }

        let mut batch = songs;
        if self.shuffle {
            shuffle_batch(&mut batch);
        }

        self.queue.append(batch, context);
        self.persist().await;
    }

    /// Replace the queue wholesale, optionally starting playback at `start`
    pub async fn set_queue(
        &mut self,
        songs: Vec<Arc<Song>>,
        context: QueueContext,
        start: Option<&SongId>,
    ) -> Result<()> {
        self.queue.replace(songs, context);

        match start {
            Some(id) => self.play_at(id).await,
            None => {
                self.persist().await;
                Ok(())
            }
        }
    }

    // ===== Playback control =====

    /// Play the queue entry with `id`
    ///
    /// Resumes without reloading if it is already the current song.
    pub async fn play_at(&mut self, id: &SongId) -> Result<()> {
        let song = self
            .queue
            .find(id)
            .cloned()
            .ok_or_else(|| PlaybackError::not_in_queue(id))?;
        self.play_song(song).await
    }

    /// Play the queue entry whose source is `uri`
    pub async fn play_at_uri(&mut self, uri: &str) -> Result<()> {
        let song = self
            .queue
            .find_by_uri(uri)
            .cloned()
            .ok_or_else(|| PlaybackError::NotInQueue(uri.to_string()))?;
        self.play_song(song).await
    }

    /// Play a song, whether or not it is part of the queue
    pub async fn play_song(&mut self, song: Arc<Song>) -> Result<()> {
        let result = if self.is_current(&song.id) {
            self.resume().await
        } else {
            self.load(song, true).await
        };
        tolerate_unavailable("play", result)
    }

    /// Resume the current song, or start the queue from the top
    pub async fn play(&mut self) -> Result<()> {
        let result = if self.current.is_some() {
            self.resume().await
        } else {
            match self.queue.get(0).cloned() {
                Some(first) => self.load(first, true).await,
                None => Err(PlaybackError::QueueEmpty),
            }
        };
        tolerate_unavailable("play", result)
    }

    pub async fn pause(&mut self) -> Result<()> {
        let result = self.pause_inner().await;
        tolerate_unavailable("pause", result)
    }

    /// Seek the current song, in seconds
    pub async fn seek(&mut self, seconds: f64) -> Result<()> {
        if self.current.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if !seconds.is_finite() {
            return Err(PlaybackError::InvalidOperation(format!(
                "seek to {seconds}"
            )));
        }

        let target = if self.duration > 0.0 {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        };

        if self.loaded {
            let Some(transport) = self.transport("seek") else {
                return Ok(());
            };
            match transport.seek_to(target).await {
                Ok(()) => {}
                Err(CadenceError::TransportUnavailable) => {
                    warn!("Ignoring seek: transport unavailable");
                    return Ok(());
                }
                Err(e) => return Err(PlaybackError::Transport(e)),
            }
        }

        self.position = target;
        self.persist().await;
        Ok(())
    }

    /// Move through the queue
    ///
    /// - repeat one restarts the current song
    /// - shuffle picks a uniformly random index
    /// - past the end: repeat all wraps to the first song keeping the
    ///   playing flag, otherwise the first song is loaded paused
    /// - before the start: repeat all wraps to the last song, otherwise
    ///   playback pauses
    pub async fn advance(&mut self, direction: Direction) -> Result<()> {
        let result = self.advance_inner(direction).await;
        tolerate_unavailable("advance", result)
    }

    /// Restart the current song if it is past the restart threshold,
    /// otherwise go to the previous queue entry
    pub async fn previous(&mut self) -> Result<()> {
        let restart = self.current.is_some()
            && self.position >= self.config.restart_threshold.as_secs_f64();

        if restart {
            let result = self.restart_current().await;
            tolerate_unavailable("previous", result)
        } else {
            self.advance(Direction::Previous).await
        }
    }

    /// Feed a transport event into the engine
    ///
    /// Returns whether the event caused an auto-advance.
    pub async fn on_transport_event(&mut self, event: TransportEvent) -> Result<bool> {
        match event {
            TransportEvent::TrackEnded { position } => {
                if self.transport.is_none() {
                    debug!("Ignoring track-ended signal: no transport bound");
                    return Ok(false);
                }

                let now = Instant::now();

                if let Some(last) = self.last_auto_advance {
                    if now.duration_since(last) < self.config.auto_advance_debounce {
                        debug!("Dropping track-ended signal within debounce window");
                        return Ok(false);
                    }
                }

                if position < self.config.min_auto_advance_position.as_secs_f64() {
                    debug!("Dropping premature track-ended signal at {:.1}s", position);
                    return Ok(false);
                }

                self.last_auto_advance = Some(now);
                self.position = position;
                self.advance(Direction::Next).await?;
                Ok(true)
            }
            TransportEvent::PositionUpdated { position, duration } => {
                if self.current.is_none() {
                    return Ok(false);
                }

                self.position = position.max(0.0);
                if duration > 0.0 {
                    self.duration = duration;
                }

                let moved = (self.position - self.last_persisted_position).abs();
                if moved >= self.config.position_persist_interval.as_secs_f64() {
                    self.persist().await;
                }
                Ok(false)
            }
        }
    }

    // ===== Toggles =====

    pub async fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        self.persist().await;
    }

    pub async fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
        self.persist().await;
    }

    /// Flip a favorite. Returns the new state.
    pub async fn toggle_favorite(&mut self, id: &SongId) -> bool {
        let favorite = if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.clone());
            true
        };

        if let Some(catalog) = &self.catalog {
            if let Err(e) = catalog.set_favorite(id, favorite).await {
                warn!("Failed to mirror favorite for {}: {}", id, e);
            }
        }

        self.persist().await;
        favorite
    }

    /// Set volume, clamped to [0, 1]
    pub async fn set_volume(&mut self, volume: f32) -> Result<f32> {
        if volume.is_nan() {
            return Err(PlaybackError::InvalidOperation("volume is NaN".into()));
        }

        self.volume = volume.clamp(0.0, 1.0);
        self.persist().await;
        Ok(self.volume)
    }

    /// Record user-entered lyrics for a song. Passing `None` for both clears the override.
    pub async fn set_lyrics(&mut self, id: &SongId, lyrics: Option<&str>, synced: Option<&str>) {
        let entry = SongLyrics {
            lyrics: lyrics.map(str::to_string),
            synced_lyrics: synced.map(str::to_string),
        };

        let source = self
            .current
            .as_ref()
            .filter(|song| &song.id == id)
            .or_else(|| self.queue.find(id))
            .cloned();
        if let Some(song) = source {
            let refreshed = with_lyrics(&song, &entry);
            self.queue.refresh(&refreshed);
            if self.is_current(id) {
                self.current = Some(refreshed);
            }
        }

        if entry.lyrics.is_none() && entry.synced_lyrics.is_none() {
            self.lyrics.remove(id);
        } else {
            self.lyrics.insert(id.clone(), entry);
        }

        if let Some(catalog) = &self.catalog {
            if let Err(e) = catalog.set_lyrics(id, lyrics, synced).await {
                warn!("Failed to mirror lyrics for {}: {}", id, e);
            }
        }

        self.persist().await;
    }

    // ===== Session =====

    /// Restore from the session store, merged with the current catalog
    ///
    /// Returns false when no session was stored.
    ///
    /// # Errors
    /// Propagates a failure to read the session store
    pub async fn load_session<I>(&mut self, catalog: I) -> Result<bool>
    where
        I: IntoIterator<Item = Arc<Song>>,
    {
        let session = self
            .persistence
            .load()
            .await
            .map_err(PlaybackError::Persistence)?;

        match session {
            Some(session) => {
                self.restore(session, catalog);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Merge a stored session with the catalog
    ///
    /// The catalog decides which songs exist and their tags; the session
    /// decides favorites, volume, repeat, shuffle and lyrics overrides. The
    /// restored state is never `Playing`.
    pub fn restore<I>(&mut self, session: Session, catalog: I)
    where
        I: IntoIterator<Item = Arc<Song>>,
    {
        let catalog: HashMap<SongId, Arc<Song>> = catalog
            .into_iter()
            .map(|song| (song.id.clone(), song))
            .collect();

        let lyrics: BTreeMap<SongId, SongLyrics> = session
            .lyrics
            .into_iter()
            .filter(|(id, _)| catalog.contains_key(id))
            .collect();
        let resolve = |id: &SongId| {
            catalog.get(id).map(|song| match lyrics.get(id) {
                Some(entry) => with_lyrics(song, entry),
                None => Arc::clone(song),
            })
        };

        let queue: Vec<Arc<Song>> = session.queue.iter().filter_map(resolve).collect();
        let dropped = session.queue.len() - queue.len();
        self.queue.replace(queue, session.context);

        self.current = session.current_song_id.as_ref().and_then(resolve);
        match &self.current {
            Some(song) => {
                self.duration = if song.duration_seconds > 0.0 {
                    song.duration_seconds
                } else {
                    session.duration.max(0.0)
                };
                self.position = if self.duration > 0.0 {
                    session.position.clamp(0.0, self.duration)
                } else {
                    session.position.max(0.0)
                };
                self.state = PlaybackState::Paused;
            }
            None => {
                self.position = 0.0;
                self.duration = 0.0;
                self.state = PlaybackState::Idle;
            }
        }
        self.loaded = false;

        self.repeat = session.repeat;
        self.shuffle = session.shuffle;
        self.favorites = session
            .favorites
            .into_iter()
            .filter(|id| catalog.contains_key(id))
            .collect();
        self.volume = if session.volume.is_nan() {
            1.0
        } else {
            session.volume.clamp(0.0, 1.0)
        };
        self.lyrics = lyrics;
        self.last_auto_advance = None;
        self.last_persisted_position = self.position;

        info!(
            "Restored session: {} queued ({} dropped), state {:?}",
            self.queue.len(),
            dropped,
            self.state
        );
    }

    /// Current state as a persistable session
    pub fn snapshot(&self) -> Session {
        Session {
            current_song_id: self.current.as_ref().map(|song| song.id.clone()),
            queue: self.queue.ids(),
            context: self.queue.context(),
            position: self.position,
            duration: self.duration,
            is_playing: self.state == PlaybackState::Playing,
            repeat: self.repeat,
            shuffle: self.shuffle,
            favorites: self.favorites.clone(),
            volume: self.volume,
            lyrics: self.lyrics.clone(),
        }
    }

    // ===== Accessors =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current(&self) -> Option<&Arc<Song>> {
        self.current.as_ref()
    }

    /// Position of the current song in the queue
    pub fn current_index(&self) -> Option<usize> {
        self.current
            .as_ref()
            .and_then(|song| self.queue.position_of(&song.id))
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn favorites(&self) -> &BTreeSet<SongId> {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &SongId) -> bool {
        self.favorites.contains(id)
    }

    /// User-entered lyrics override for a song
    pub fn lyrics_for(&self, id: &SongId) -> Option<&SongLyrics> {
        self.lyrics.get(id)
    }

    /// Timed lyric line for the current position
    pub fn active_lyric(&self) -> Option<LyricLine> {
        let synced = self.current.as_ref()?.synced_lyrics.as_deref()?;
        let lines = parse_synced_lyrics(synced);
        LyricLine::active_at(&lines, self.position).cloned()
    }

    // ===== Internals =====

    fn is_current(&self, id: &SongId) -> bool {
        self.current.as_ref().is_some_and(|song| &song.id == id)
    }

    fn transport(&self, operation: &str) -> Option<Arc<dyn Transport>> {
        if self.transport.is_none() {
            warn!("Ignoring {}: no transport bound", operation);
        }
        self.transport.clone()
    }

    /// Bind the transport to `song` from its start and commit it as current
    async fn load(&mut self, song: Arc<Song>, autoplay: bool) -> Result<()> {
        let Some(transport) = self.transport("load") else {
            return Ok(());
        };

        transport
            .replace(&song.uri)
            .await
            .map_err(PlaybackError::Transport)?;

        // The transport no longer holds `current`; the next resume rebinds it
        self.loaded = false;
        if let Err(e) = start_from_top(transport.as_ref(), autoplay).await {
            if self.state == PlaybackState::Playing {
                self.state = PlaybackState::Paused;
            }
            return Err(e);
        }

        let duration = match transport.status().await {
            Ok(status) if status.duration > 0.0 => status.duration,
            _ => song.duration_seconds,
        };

        debug!("Loaded {} (autoplay: {})", song.uri, autoplay);
        self.current = Some(song);
        self.loaded = true;
        self.position = 0.0;
        self.duration = duration;
        self.state = if autoplay {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
        self.persist().await;
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        let Some(song) = self.current.clone() else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        let Some(transport) = self.transport("play") else {
            return Ok(());
        };

        // A restored session has a current song the transport has never seen
        if !self.loaded {
            transport
                .replace(&song.uri)
                .await
                .map_err(PlaybackError::Transport)?;
            transport
                .seek_to(self.position)
                .await
                .map_err(PlaybackError::Transport)?;
            self.loaded = true;
        }

        transport.play().await.map_err(PlaybackError::Transport)?;
        self.state = PlaybackState::Playing;
        self.persist().await;
        Ok(())
    }

    async fn pause_inner(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some(transport) = self.transport("pause") else {
            return Ok(());
        };

        transport.pause().await.map_err(PlaybackError::Transport)?;
        self.state = PlaybackState::Paused;
        self.persist().await;
        Ok(())
    }

    async fn restart_current(&mut self) -> Result<()> {
        let Some(song) = self.current.clone() else {
            debug!("Nothing to restart");
            return Ok(());
        };
        let Some(transport) = self.transport("restart") else {
            return Ok(());
        };

        if !self.loaded {
            transport
                .replace(&song.uri)
                .await
                .map_err(PlaybackError::Transport)?;
            self.loaded = true;
        }
        transport
            .seek_to(0.0)
            .await
            .map_err(PlaybackError::Transport)?;
        transport.play().await.map_err(PlaybackError::Transport)?;

        self.position = 0.0;
        self.state = PlaybackState::Playing;
        self.persist().await;
        Ok(())
    }

    async fn advance_inner(&mut self, direction: Direction) -> Result<()> {
        if self.transport("advance").is_none() {
            return Ok(());
        }

        if self.repeat == RepeatMode::One {
            return self.restart_current().await;
        }

        let len = self.queue.len();
        if len == 0 {
            return Err(PlaybackError::QueueEmpty);
        }

        let target = if self.shuffle {
            Target::Index(random_index(len))
        } else {
            // Outside the queue, Next starts from a virtual slot before the
            // first entry and Previous from one after the last
            match (direction, self.current_index()) {
                (Direction::Next, Some(i)) if i + 1 < len => Target::Index(i + 1),
                (Direction::Next, Some(_)) => Target::PastEnd,
                (Direction::Next, None) => Target::Index(0),
                (Direction::Previous, Some(0)) => Target::BeforeStart,
                (Direction::Previous, Some(i)) => Target::Index(i - 1),
                (Direction::Previous, None) => Target::Index(len - 1),
            }
        };

        let was_playing = self.is_playing();
        let wrap = self.repeat == RepeatMode::All;

        match target {
            Target::Index(index) => self.load_index(index, true).await,
            Target::PastEnd => self.load_index(0, wrap && was_playing).await,
            Target::BeforeStart if wrap => self.load_index(len - 1, was_playing).await,
            Target::BeforeStart => self.pause_inner().await,
        }
    }

    async fn load_index(&mut self, index: usize, autoplay: bool) -> Result<()> {
        let song = self
            .queue
            .get(index)
            .cloned()
            .ok_or_else(|| PlaybackError::InvalidOperation(format!("queue index {index}")))?;
        self.load(song, autoplay).await
    }

    /// Write a session snapshot; failures are logged only
    async fn persist(&mut self) {
        let session = self.snapshot();
        if let Err(e) = self.persistence.save(&session).await {
            warn!("Failed to persist session: {}", e);
        }
        self.last_persisted_position = self.position;
    }
}

async fn start_from_top(transport: &dyn Transport, autoplay: bool) -> Result<()> {
    transport
        .seek_to(0.0)
        .await
        .map_err(PlaybackError::Transport)?;
    let started = if autoplay {
        transport.play().await
    } else {
        transport.pause().await
    };
    started.map_err(PlaybackError::Transport)
}

fn with_lyrics(song: &Arc<Song>, entry: &SongLyrics) -> Arc<Song> {
    let mut updated = Song::clone(song);
    updated.lyrics.clone_from(&entry.lyrics);
    updated.synced_lyrics.clone_from(&entry.synced_lyrics);
    Arc::new(updated)
}

/// No audio engine yet: log and leave state untouched
fn tolerate_unavailable(operation: &str, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_transport_unavailable() => {
            warn!("Ignoring {}: transport unavailable", operation);
            Ok(())
        }
        other => other,
    }
}
