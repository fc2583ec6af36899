//! Error types for tr1d1um request conversion.
//!
//! This module provides [`ConversionError`], raised by the command
//! constructors and by the write-command deducer. Every variant is terminal:
//! it is reported to the caller as a client error and is never retried.
//!
//! | `ErrorCategory` | Raised by | Status |
//! |---|---|---|
//! | `Request` | constructors (names, row, table, body) | 400 |
//! | `WriteContract` | write deduction and validation | 400 |
//! | `Transport` | device sender and retry executor | 500 / timeout class |
//! | `Device` | device status decoding | 500 |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ConversionError`].
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or malformed request input.
    Request,
    /// Write-command header contract or structural violation.
    WriteContract,
    /// Failure while talking to the device transport.
    Transport,
    /// The device reply could not be interpreted.
    Device,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Request | Self::WriteContract => StatusCode::BAD_REQUEST,
            Self::Transport | Self::Device => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised while converting an HTTP request into a WDMP command.
///
/// Step-3 write validation deliberately collapses every rule violation
/// into [`ConversionError::InvalidWriteCommand`].
///
/// # Example
///
/// ```
/// use tr1d1um_core::{ConversionError, ErrorCategory};
///
/// let err = ConversionError::MissingNames;
/// assert_eq!(err.category(), ErrorCategory::Request);
/// assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
/// ```
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The names form value was absent or empty.
    #[error("names parameter is required to be valid")]
    MissingNames,

    /// The row path variable was absent or empty.
    #[error("non-empty row name is required")]
    MissingRow,

    /// The table path variable was absent.
    #[error("table name is required in the request path")]
    MissingTable,

    /// The request body could not be decoded.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The body decoded to an explicit null row.
    #[error("row must not be null")]
    NullRow,

    /// The body decoded to an explicit null list of rows.
    #[error("rows must not be null")]
    NullRows,

    /// An old correlation id was supplied without a new one.
    #[error("NewCid is required for TEST_AND_SET")]
    NewCorrelationIdRequired,

    /// The deduced write command failed structural validation.
    #[error("invalid SET message")]
    InvalidWriteCommand,
}

impl ConversionError {
    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingNames
            | Self::MissingRow
            | Self::MissingTable
            | Self::MalformedBody(_)
            | Self::NullRow
            | Self::NullRows => ErrorCategory::Request,
            Self::NewCorrelationIdRequired | Self::InvalidWriteCommand => {
                ErrorCategory::WriteContract
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code for log fields.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingNames => "MISSING_NAMES",
            Self::MissingRow => "MISSING_ROW",
            Self::MissingTable => "MISSING_TABLE",
            Self::MalformedBody(_) => "MALFORMED_BODY",
            Self::NullRow => "NULL_ROW",
            Self::NullRows => "NULL_ROWS",
            Self::NewCorrelationIdRequired => "NEW_CID_REQUIRED",
            Self::InvalidWriteCommand => "INVALID_WRITE_COMMAND",
        }
    }
}
