//! Shared plumbing for the berrypad crates: errors, configuration,
//! telemetry setup and timing helpers.

pub mod config;
pub mod error;
pub mod perf;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::config::{FileStore, Loader, PreviewConfig, Saver};
pub use crate::error::{BerrypadError, ConfigError, ParseError};
