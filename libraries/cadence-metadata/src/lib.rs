//! Cadence Metadata
//!
//! Tag extraction with a two-level cache in front of the parser.
//!
//! - [`LoftyParser`] reads tags and embedded pictures from in-memory bytes
//! - [`MetadataCache`] maps `(uri, modified_at)` (strict) or `uri` alone
//!   (loose) to a [`SongMetadata`] blob in any `KeyValueStore`
//! - [`MetadataExtractor`] ties them together with the cover art store
//!
//! [`SongMetadata`]: cadence_core::SongMetadata

mod cache;
mod error;
mod extractor;
mod parser;

pub use cache::{loose_key, strict_key, MetadataCache, LOOSE_PREFIX, STRICT_PREFIX};
pub use error::{MetadataError, Result};
pub use extractor::{Extraction, ExtractionSource, MetadataExtractor};
pub use parser::LoftyParser;
