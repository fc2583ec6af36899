//! # Tr1d1um
//!
//! WDMP/WRP translation gateway.
//!
//! Tr1d1um turns HTTP device-management requests into WDMP commands, wraps
//! them in WRP envelopes, delivers them to devices and maps the outcome
//! back to an HTTP result.
//!
//! ## Crates
//!
//! - [`core`] - WDMP command and WRP message models
//! - [`extract`] - Request extraction context, path variables and form values
//! - [`convert`] - Command constructors, set deduction and envelope composition
//! - [`config`] - Typed configuration and the layered loader
//! - [`telemetry`] - Logging initialization
//!
//! ## Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use tr1d1um::{config::ConfigLoader, telemetry, ConversionHandler};
//!
//! let config = ConfigLoader::new().with_env_prefix("TR1D1UM").load()?;
//! telemetry::init_logging(&(&config.logging).into())?;
//!
//! let handler = ConversionHandler::from_config(&config)?;
//! let resp = handler.handle(&ctx, &CancellationToken::new()).await;
//! ```

#![doc(html_root_url = "https://docs.rs/tr1d1um/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod response;
mod retry;
mod transport;
mod validator;

pub use error::{GatewayError, GatewayResult};
pub use handler::ConversionHandler;
pub use response::{
    handle_response, handle_whole_response, report_error, status_code_from_rdk_response,
    timeout_status, write_response, RdkStatusError, Tr1d1umResponse, TIMEOUT_MESSAGE,
    TIMEOUT_STATUS_CODE,
};
pub use retry::{
    on_retry_internal_failure, should_retry_on_response, Attempt, IntervalRetry, RetryStrategy,
};
pub use transport::{
    DeviceReply, HttpSender, Sender, TransportError, TransportResult, DEVICE_PATH,
};
pub use validator::RequestValidator;

/// Re-export of tr1d1um-core.
pub use tr1d1um_core as core;

/// Re-export of tr1d1um-extract.
pub use tr1d1um_extract as extract;

/// Re-export of tr1d1um-convert.
pub use tr1d1um_convert as convert;

/// Re-export of tr1d1um-config.
pub use tr1d1um_config as config;

/// Re-export of tr1d1um-telemetry.
pub use tr1d1um_telemetry as telemetry;
