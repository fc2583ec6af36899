//! Typed configuration for tr1d1um.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`TR1D1UM__SECTION__KEY`)
//! - Strict parsing (unknown fields are rejected)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [gateway]
//! target_url = "http://localhost:6000"
//! wrp_source = "dns:tr1d1um.example.com"
//! supported_services = ["config"]
//! client_timeout = "30s"
//! resp_wait_timeout = "40s"
//! net_dialer_timeout = "5s"
//! retry_interval = "2s"
//! max_retries = 2
//!
//! [read]
//! names_key = "names"
//! attributes_key = "attributes"
//! names_separator = ","
//!
//! [logging]
//! level = "info"
//! format = "json"
//! file_line_info = false
//! ```

#![doc(html_root_url = "https://docs.rs/tr1d1um-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::Tr1d1umConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{GatewaySettings, LogFormat, LoggingSettings, ReadSettings};
