//! # Tr1d1um Extract
//!
//! Request access for the tr1d1um conversion pipeline.
//!
//! Routing happens outside the gateway. Whatever router is in front of it
//! hands over the matched path variables together with the request, and
//! this crate exposes the pieces the command constructors need:
//!
//! | Accessor | Source | Description |
//! |----------|--------|-------------|
//! | [`ExtractionContext::path_var`] | URL path | Named path variables (`deviceid`, `service`, `parameter`) |
//! | [`form_value`] | Query string / form body | First value of a form key |
//! | [`ExtractionContext::header`] | Headers | A header value as a string |
//! | [`ExtractionContext::body`] | Request body | Raw request bytes |
//!
//! ## Example
//!
//! ```rust
//! use tr1d1um_extract::{form_value, ExtractionContext};
//! use http::Method;
//!
//! let ctx = ExtractionContext::builder()
//!     .method(Method::GET)
//!     .uri("/api/v2/device/mac:112233445566/config?names=a,b")
//!     .path_var("deviceid", "mac:112233445566")
//!     .path_var("service", "config")
//!     .build();
//!
//! assert_eq!(ctx.path_var("service"), Some("config"));
//! assert_eq!(form_value(&ctx, "names").as_deref(), Some("a,b"));
//! ```

#![doc(html_root_url = "https://docs.rs/tr1d1um-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod form;
mod vars;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use form::{form_value, form_values};
pub use vars::PathVars;

/// Path variable holding the device identifier.
pub const DEVICE_ID_VAR: &str = "deviceid";

/// Path variable holding the target service.
pub const SERVICE_VAR: &str = "service";

/// Path variable holding the row or table identifier.
pub const PARAMETER_VAR: &str = "parameter";
