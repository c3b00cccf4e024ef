//! Cadence command line front end
//!
//! Wires the library crates together: configuration, the SQLite-backed
//! catalog, the reconciler and the playback engine.

pub mod config;
pub mod error;
pub mod library;

pub use config::CadenceConfig;
pub use error::{CliError, Result};
pub use library::Library;
