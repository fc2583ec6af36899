//! Gateway error types.

use http::StatusCode;
use thiserror::Error;
use tr1d1um_config::ConfigError;
use tr1d1um_convert::DeviceIdError;
use tr1d1um_core::ConversionError;
use tr1d1um_extract::ExtractionError;

use crate::transport::TransportError;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that stop a request before or while it is sent to a device.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The `service` path variable is not in the allowlist.
    #[error("unsupported service: {service:?}")]
    UnsupportedService {
        /// The rejected service.
        service: String,
    },

    /// The `deviceid` path variable does not canonicalize.
    #[error("invalid device id: {0}")]
    InvalidDeviceId(#[from] DeviceIdError),

    /// A required request value is missing.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The request could not be turned into a WDMP command.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The request method has no WDMP counterpart.
    #[error("method not allowed: {method}")]
    MethodNotAllowed {
        /// The rejected method.
        method: String,
    },

    /// A command could not be serialized.
    #[error("failed to encode WDMP command: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport failed before anything reached the wire.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Create an unsupported service error.
    pub fn unsupported_service(service: impl Into<String>) -> Self {
        Self::UnsupportedService {
            service: service.into(),
        }
    }

    /// Get the HTTP status code for this error.
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedService { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidDeviceId(_) => StatusCode::BAD_REQUEST,
            Self::Extraction(e) => e.status_code(),
            Self::Conversion(e) => e.status_code(),
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Encode(_) | Self::Transport(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message written into the `{"message": ...}` response body.
    ///
    /// Internal failures are not described to the caller.
    pub fn response_message(&self) -> String {
        match self {
            Self::UnsupportedService { .. } => "Unsupported Service".to_owned(),
            Self::InvalidDeviceId(_) => "Invalid deviceID".to_owned(),
            Self::Extraction(e) => e.to_string(),
            Self::Conversion(e) => e.to_string(),
            Self::MethodNotAllowed { .. } => "Method Not Allowed".to_owned(),
            Self::Encode(_) | Self::Transport(_) | Self::Config(_) => String::new(),
        }
    }

    /// Machine-readable error code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedService { .. } => "UNSUPPORTED_SERVICE",
            Self::InvalidDeviceId(_) => "INVALID_DEVICE_ID",
            Self::Extraction(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Encode(_) => "ENCODE_FAILED",
            Self::Transport(_) => "TRANSPORT_FAILED",
            Self::Config(_) => "INVALID_CONFIG",
        }
    }

    /// Returns `true` if the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
