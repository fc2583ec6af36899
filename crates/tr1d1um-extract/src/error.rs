//! Extraction error types.

use http::StatusCode;
use std::fmt;

/// Where a value was being extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path variables matched by the router.
    Path,
    /// Query string or urlencoded form body.
    Form,
    /// HTTP headers.
    Header,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Form => write!(f, "form"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Error raised when a required request value cannot be extracted.
///
/// # Example
///
/// ```rust
/// use tr1d1um_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "deviceid");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.field(), "deviceid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    Missing,
    Invalid,
}

impl ExtractionError {
    /// Creates an error for a missing or empty value.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Missing,
            field: field.into(),
        }
    }

    /// Creates an error for a value that is present but unreadable.
    #[must_use]
    pub fn invalid(source: ExtractionSource, field: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Invalid,
            field: field.into(),
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Returns the error code suitable for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::Invalid => "INVALID_PARAMETER",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ExtractionErrorKind::Missing => write!(
                f,
                "missing required {} parameter: {}",
                self.extraction_source, self.field
            ),
            ExtractionErrorKind::Invalid => write!(
                f,
                "invalid {} parameter: {}",
                self.extraction_source, self.field
            ),
        }
    }
}

impl std::error::Error for ExtractionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_error() {
        let err = ExtractionError::missing(ExtractionSource::Path, "service");

        assert_eq!(err.extraction_source(), ExtractionSource::Path);
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
        assert_eq!(err.to_string(), "missing required path parameter: service");
    }

    #[test]
    fn test_invalid_error() {
        let err = ExtractionError::invalid(ExtractionSource::Header, "authorization");

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(err.to_string().contains("header"));
    }
}
