//! Structured logging for tr1d1um.
//!
//! The gateway logs through `tracing`. This crate installs the subscriber:
//! an `EnvFilter` built from the configured level and a JSON (production)
//! or pretty (development) fmt layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use tr1d1um_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(device_id = "mac:112233445566", "request converted");
//! ```

#![doc(html_root_url = "https://docs.rs/tr1d1um-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
