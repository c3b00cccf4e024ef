//! Fakes for engine tests: a recording transport and in-memory persistence

#![allow(dead_code)]

use async_trait::async_trait;
use cadence_core::{
    CadenceError, Session, SessionPersistence, Song, SongId, Transport, TransportStatus,
};
use cadence_playback::{EngineConfig, PlaybackEngine};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Replace(String),
    Play,
    Pause,
    Seek(f64),
}

/// Records every call; can be switched to report `TransportUnavailable`
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    unavailable: AtomicBool,
    reject_seek: AtomicBool,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn replaces(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Replace(_)))
            .count()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject the next seek with a decoder error
    pub fn fail_next_seek(&self) {
        self.reject_seek.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> cadence_core::Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CadenceError::TransportUnavailable);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn replace(&self, uri: &str) -> cadence_core::Result<()> {
        self.record(Call::Replace(uri.to_string()))
    }

    async fn play(&self) -> cadence_core::Result<()> {
        self.record(Call::Play)
    }

    async fn pause(&self) -> cadence_core::Result<()> {
        self.record(Call::Pause)
    }

    async fn seek_to(&self, seconds: f64) -> cadence_core::Result<()> {
        if self.reject_seek.swap(false, Ordering::SeqCst) {
            return Err(CadenceError::Other("seek rejected by decoder".into()));
        }
        self.record(Call::Seek(seconds))
    }

    async fn status(&self) -> cadence_core::Result<TransportStatus> {
        Ok(TransportStatus::default())
    }
}

/// Keeps the last saved session in memory
#[derive(Default)]
pub struct MemoryPersistence {
    session: Mutex<Option<Session>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryPersistence {
    pub fn with_session(session: Session) -> Self {
        let persistence = Self::default();
        *persistence.session.lock().unwrap() = Some(session);
        persistence
    }

    pub fn saved(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionPersistence for MemoryPersistence {
    async fn load(&self) -> cadence_core::Result<Option<Session>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CadenceError::storage("database is locked"));
        }
        Ok(self.saved())
    }

    async fn save(&self, session: &Session) -> cadence_core::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CadenceError::storage("disk full"));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}

pub fn song(id: &str) -> Arc<Song> {
    let mut song = Song::placeholder(SongId::new(id), format!("/music/{id}.mp3"), 1024, Some(1));
    song.title = format!("Song {id}");
    song.duration_seconds = 180.0;
    Arc::new(song)
}

pub fn songs(ids: &[&str]) -> Vec<Arc<Song>> {
    ids.iter().map(|id| song(id)).collect()
}

pub fn id(id: &str) -> SongId {
    SongId::new(id)
}

pub struct Rig {
    pub engine: PlaybackEngine,
    pub transport: Arc<FakeTransport>,
    pub persistence: Arc<MemoryPersistence>,
}

pub fn rig() -> Rig {
    rig_with(MemoryPersistence::default())
}

pub fn rig_with(persistence: MemoryPersistence) -> Rig {
    let transport = Arc::new(FakeTransport::default());
    let persistence = Arc::new(persistence);
    let engine = PlaybackEngine::new(EngineConfig::default(), persistence.clone())
        .with_transport(transport.clone());

    Rig {
        engine,
        transport,
        persistence,
    }
}

pub fn current_id(engine: &PlaybackEngine) -> Option<String> {
    engine.current().map(|song| song.id.to_string())
}
