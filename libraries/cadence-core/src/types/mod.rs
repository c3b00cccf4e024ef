//! Domain types shared across Cadence crates

mod capability;
mod ids;
mod session;
mod song;

pub use capability::{FileStat, ParsedTags, TransportEvent, TransportStatus};
pub use ids::SongId;
pub use session::{QueueContext, RepeatMode, Session, SongLyrics};
pub use song::{Song, SongMetadata};
