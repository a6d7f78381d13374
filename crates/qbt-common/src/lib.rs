pub mod config;
pub mod error;

pub use config::{DaemonConfig, ExporterConfig, LogLevel, RawConfig};
pub use error::{ExporterError, Result};
