//! Cadence - Playback Queue Engine
//!
//! Owns the queue, the current song and the playing flag. The audio engine
//! itself sits behind the core `Transport` trait; every state change is
//! written through `SessionPersistence` so the session can be restored on
//! the next start.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{QueueContext, Session, SessionPersistence};
//! use cadence_playback::{EngineConfig, PlaybackEngine};
//! use std::sync::Arc;
//!
//! # async fn run(persistence: Arc<dyn SessionPersistence>, songs: Vec<Arc<cadence_core::Song>>) -> cadence_playback::Result<()> {
//! let mut engine = PlaybackEngine::new(EngineConfig::default(), persistence);
//! engine.enqueue(songs, QueueContext::Library).await;
//! engine.play().await?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod queue;
mod shuffle;
pub mod types;

pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use queue::Queue;
pub use types::{Direction, EngineConfig, PlaybackState};
