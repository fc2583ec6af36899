//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is the only view of an inbound request that the
//! conversion pipeline sees.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};

use crate::{ExtractionError, ExtractionSource, PathVars};

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use tr1d1um_extract::{ExtractionContext, PathVars};
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut vars = PathVars::new();
/// vars.push("deviceid", "mac:112233445566");
///
/// let ctx = ExtractionContext::new(
///     Method::DELETE,
///     Uri::from_static("/api/v2/device/mac:112233445566/config/Device.Table.1."),
///     HeaderMap::new(),
///     Bytes::new(),
///     vars,
/// );
///
/// assert_eq!(ctx.method(), &Method::DELETE);
/// assert_eq!(ctx.path_var("deviceid"), Some("mac:112233445566"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_vars: PathVars,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_vars: PathVars,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_vars,
        }
    }

    /// Creates a context from a buffered request and the router's matched
    /// path variables.
    #[must_use]
    pub fn from_request(request: Request<Bytes>, path_vars: PathVars) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, path_vars)
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder::new()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the matched path variables.
    #[must_use]
    pub fn path_vars(&self) -> &PathVars {
        &self.path_vars
    }

    /// Returns a single path variable.
    #[must_use]
    pub fn path_var(&self, name: &str) -> Option<&str> {
        self.path_vars.get(name)
    }

    /// Returns a path variable that must be present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] when the variable is absent or empty.
    pub fn required_path_var(&self, name: &str) -> Result<&str, ExtractionError> {
        self.path_var(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, name))
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a header value, treating an empty value as absent.
    #[must_use]
    pub fn non_empty_header(&self, name: &str) -> Option<&str> {
        self.header(name).filter(|v| !v.is_empty())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Checks if the request body is empty.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Builder for constructing an `ExtractionContext`.
///
/// Unset method and URI default to `GET /`.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_vars: PathVars,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI. An unparsable URI leaves `/`.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.parse().unwrap_or_default();
        self
    }

    /// Adds a single header. Invalid names or values are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a single path variable.
    #[must_use]
    pub fn path_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_vars.push(name, value);
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            path_vars: self.path_vars,
        }
    }
}
