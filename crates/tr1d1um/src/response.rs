//! Response normalization.
//!
//! Every terminal outcome of a request, whether a decoded device reply, a
//! transport failure or a rejected request, ends up in a
//! [`Tr1d1umResponse`] through the functions in this module.

use std::error::Error as StdError;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tr1d1um_core::wrp::JSON_CONTENT_TYPE;
use tr1d1um_core::Message;

use crate::transport::{DeviceReply, TransportResult};

/// Code reserved for timeout-class failures.
///
/// It sits outside the 4xx and 5xx ranges so a real `503` from the
/// transport or a device is never mistaken for a timeout.
pub const TIMEOUT_STATUS_CODE: u16 = 600;

/// Status used for timeout-class failures.
///
/// # Example
///
/// ```
/// use tr1d1um::timeout_status;
///
/// let status = timeout_status();
/// assert_eq!(status.as_u16(), 600);
/// assert!(!status.is_client_error() && !status.is_server_error());
/// ```
pub fn timeout_status() -> StatusCode {
    StatusCode::from_u16(TIMEOUT_STATUS_CODE).unwrap_or(StatusCode::GATEWAY_TIMEOUT)
}

/// Message written for timeout-class failures.
pub const TIMEOUT_MESSAGE: &str = "Error Timeout";

/// The normalized result of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tr1d1umResponse {
    /// Response body.
    pub body: Bytes,
    /// Response status.
    pub code: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

impl Default for Tr1d1umResponse {
    fn default() -> Self {
        Self {
            body: Bytes::new(),
            code: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

impl Tr1d1umResponse {
    /// Create an empty `200 OK` response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the `Content-Type` header, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Sets or clears the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: Option<&str>) {
        match content_type.and_then(|ct| HeaderValue::from_str(ct).ok()) {
            Some(value) => {
                self.headers.insert(CONTENT_TYPE, value);
            }
            None => {
                self.headers.remove(CONTENT_TYPE);
            }
        }
    }

    /// Converts into an `http::Response` for the serving layer.
    pub fn into_http_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.code;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(serde::Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

/// Overwrites `resp` with a `{"message": ...}` JSON body and `code`.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use tr1d1um::{write_response, Tr1d1umResponse};
///
/// let mut resp = Tr1d1umResponse::new();
/// write_response("Invalid deviceID", StatusCode::BAD_REQUEST, &mut resp);
///
/// assert_eq!(resp.body, r#"{"message":"Invalid deviceID"}"#);
/// assert_eq!(resp.content_type(), Some("application/json"));
/// ```
pub fn write_response(message: &str, code: StatusCode, resp: &mut Tr1d1umResponse) {
    let body = serde_json::to_vec(&MessageBody { message }).unwrap_or_default();

    resp.headers.clear();
    resp.headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    resp.code = code;
    resp.body = Bytes::from(body);
}

/// Classifies `error` and writes the matching message into `resp`.
///
/// Timeout-class errors, recognized by their display text, become
/// [`TIMEOUT_MESSAGE`] with [`timeout_status()`]. Everything else becomes an
/// empty message with 500. `None` leaves `resp` untouched.
pub fn report_error(error: Option<&(dyn StdError + '_)>, resp: &mut Tr1d1umResponse) {
    let Some(error) = error else {
        return;
    };

    let text = error.to_string();
    let (message, code) = if is_timeout_text(&text) {
        (TIMEOUT_MESSAGE, timeout_status())
    } else {
        ("", StatusCode::INTERNAL_SERVER_ERROR)
    };

    tracing::debug!(error = %text, http.status_code = code.as_u16(), "reporting error");
    write_response(message, code, resp);
}

fn is_timeout_text(text: &str) -> bool {
    text.ends_with("context canceled")
        || text.ends_with("deadline exceeded")
        || text.contains("Client.Timeout exceeded")
}

/// Failure to read a device-reported status.
///
/// Callers that still need a code use [`RdkStatusError::fallback`], which
/// is never authoritative.
#[derive(Debug, Error)]
pub enum RdkStatusError {
    /// The payload is not a JSON object with a numeric `statusCode`.
    #[error("failed to decode device status: {0}")]
    Decode(#[from] serde_json::Error),

    /// The payload carries no non-zero `statusCode`.
    #[error("device status code is missing")]
    Missing,

    /// The payload carries a number that is not an HTTP status.
    #[error("device status code {0} is not a valid HTTP status")]
    Invalid(i64),
}

impl RdkStatusError {
    /// Status to use when the device status cannot be read.
    pub const fn fallback(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Deserialize)]
struct RdkResponse {
    #[serde(rename = "statusCode", default)]
    status_code: i64,
}

/// Extracts the device-reported status from a WDMP reply payload.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use tr1d1um::status_code_from_rdk_response;
///
/// let code = status_code_from_rdk_response(br#"{"statusCode": 520}"#).unwrap();
/// assert_eq!(code.as_u16(), 520);
///
/// let err = status_code_from_rdk_response(b"").unwrap_err();
/// assert_eq!(err.fallback(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
pub fn status_code_from_rdk_response(payload: &[u8]) -> Result<StatusCode, RdkStatusError> {
    let response: RdkResponse = serde_json::from_slice(payload)?;

    if response.status_code == 0 {
        return Err(RdkStatusError::Missing);
    }

    u16::try_from(response.status_code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(RdkStatusError::Invalid(response.status_code))
}

/// Normalizes the outcome of one WRP exchange.
pub fn handle_response(result: TransportResult<DeviceReply>) -> Tr1d1umResponse {
    let mut resp = Tr1d1umResponse::new();

    let reply = match result {
        Ok(reply) => reply,
        Err(error) => {
            tracing::warn!(%error, "device request failed");
            report_error(Some(&error), &mut resp);
            return resp;
        }
    };

    if reply.status != StatusCode::OK {
        tracing::debug!(
            http.status_code = reply.status.as_u16(),
            "passing through non-200 transport reply"
        );
        return passthrough(reply);
    }

    let message = match Message::decode(&reply.body) {
        Ok(message) => message,
        Err(error) => {
            tracing::error!(%error, "failed to decode WRP reply");
            report_error(Some(&error), &mut resp);
            return resp;
        }
    };

    resp.code = match status_code_from_rdk_response(&message.payload) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(
                %error,
                transaction_id = %message.transaction_uuid,
                "could not read device status"
            );
            error.fallback()
        }
    };
    resp.set_content_type(Some(message.content_type.as_str()).filter(|ct| !ct.is_empty()));
    resp.body = message.payload;
    resp
}

/// Passes a transport outcome through without decoding the body.
pub fn handle_whole_response(result: TransportResult<DeviceReply>) -> Tr1d1umResponse {
    match result {
        Ok(reply) => passthrough(reply),
        Err(error) => {
            tracing::warn!(%error, "device request failed");
            let mut resp = Tr1d1umResponse::new();
            report_error(Some(&error), &mut resp);
            resp
        }
    }
}

fn passthrough(reply: DeviceReply) -> Tr1d1umResponse {
    let mut resp = Tr1d1umResponse {
        body: reply.body,
        code: reply.status,
        headers: HeaderMap::new(),
    };
    resp.set_content_type(reply.content_type.as_deref());
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use tr1d1um_core::MessageType;

    fn wrp_reply(payload: &'static [u8], content_type: &str) -> DeviceReply {
        let message = Message {
            message_type: MessageType::SimpleRequestResponse,
            content_type: content_type.into(),
            payload: Bytes::from_static(payload),
            source: "mac:112233445566/config".into(),
            dest: "dns:tr1d1um/config".into(),
            transaction_uuid: "tid".into(),
        };
        DeviceReply::new(
            StatusCode::OK,
            Some(JSON_CONTENT_TYPE),
            message.encode().unwrap(),
        )
    }

    #[test]
    fn test_default_response() {
        let resp = Tr1d1umResponse::default();
        assert_eq!(resp.code, StatusCode::OK);
        assert!(resp.body.is_empty());
        assert!(resp.headers.is_empty());
    }

    #[test]
    fn test_write_response() {
        let mut resp = Tr1d1umResponse::new();
        write_response("Unsupported Service", StatusCode::BAD_REQUEST, &mut resp);

        assert_eq!(resp.code, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, r#"{"message":"Unsupported Service"}"#);
        assert_eq!(resp.content_type(), Some("application/json"));
    }

    #[test]
    fn test_write_response_escapes_message() {
        let mut resp = Tr1d1umResponse::new();
        write_response(r#"bad "names""#, StatusCode::BAD_REQUEST, &mut resp);

        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["message"], r#"bad "names""#);
    }

    #[test]
    fn test_report_error_none_is_noop() {
        let mut resp = Tr1d1umResponse::new();
        report_error(None, &mut resp);
        assert_eq!(resp, Tr1d1umResponse::default());
    }

    #[test]
    fn test_report_error_timeouts() {
        let errors = [
            TransportError::Canceled,
            TransportError::DeadlineExceeded,
            TransportError::ClientTimeout {
                url: "http://localhost:6000".into(),
            },
        ];

        for error in &errors {
            let mut resp = Tr1d1umResponse::new();
            report_error(Some(error), &mut resp);

            assert_eq!(resp.code, timeout_status(), "{error}");
            assert_eq!(resp.body, r#"{"message":"Error Timeout"}"#);
        }
    }

    #[test]
    fn test_report_error_generic() {
        let mut resp = Tr1d1umResponse::new();
        report_error(
            Some(&TransportError::request("connection refused")),
            &mut resp,
        );

        assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body, r#"{"message":""}"#);
    }

    #[test]
    fn test_status_code_from_rdk_response() {
        assert_eq!(
            status_code_from_rdk_response(br#"{"statusCode": 200}"#).unwrap(),
            StatusCode::OK
        );
        assert_eq!(
            status_code_from_rdk_response(br#"{"statusCode": 520, "message": "x"}"#)
                .unwrap()
                .as_u16(),
            520
        );

        let missing = status_code_from_rdk_response(br#"{"something":"irrelevant"}"#).unwrap_err();
        assert!(matches!(missing, RdkStatusError::Missing));
        assert_eq!(missing.fallback(), StatusCode::INTERNAL_SERVER_ERROR);

        assert!(matches!(
            status_code_from_rdk_response(b""),
            Err(RdkStatusError::Decode(_))
        ));
        assert!(matches!(
            status_code_from_rdk_response(br#"{"statusCode": 70000}"#),
            Err(RdkStatusError::Invalid(70000))
        ));
        assert!(matches!(
            status_code_from_rdk_response(br#"{"statusCode": -1}"#),
            Err(RdkStatusError::Invalid(-1))
        ));
    }

    #[test]
    fn test_handle_response_transport_error() {
        let resp = handle_response(Err(TransportError::DeadlineExceeded));
        assert_eq!(resp.code, timeout_status());
        assert_eq!(resp.body, r#"{"message":"Error Timeout"}"#);
    }

    #[test]
    fn test_handle_response_non_200_passthrough() {
        let reply = DeviceReply::new(StatusCode::NOT_FOUND, Some("text/plain"), "no such device");
        let resp = handle_response(Ok(reply));

        assert_eq!(resp.code, StatusCode::NOT_FOUND);
        assert_eq!(resp.body, "no such device");
        assert_eq!(resp.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_passthrough_503_is_not_a_timeout() {
        let reply = DeviceReply::new(
            StatusCode::SERVICE_UNAVAILABLE,
            Some("text/plain"),
            "overloaded",
        );
        let resp = handle_response(Ok(reply));

        assert_eq!(resp.code, StatusCode::SERVICE_UNAVAILABLE);
        assert_ne!(resp.code, timeout_status());
        assert_eq!(resp.body, "overloaded");
        assert!(!crate::retry::should_retry_on_response(&resp));
    }

    #[test]
    fn test_device_reported_503_is_not_a_timeout() {
        let payload = br#"{"statusCode": 503, "message": "busy"}"#;
        let resp = handle_response(Ok(wrp_reply(payload, "application/json")));

        assert_eq!(resp.code, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!crate::retry::should_retry_on_response(&resp));
    }

    #[test]
    fn test_timeout_status_is_reserved() {
        let status = timeout_status();
        assert_eq!(status.as_u16(), TIMEOUT_STATUS_CODE);
        assert!(!status.is_client_error());
        assert!(!status.is_server_error());
    }

    #[test]
    fn test_handle_response_decodes_device_status() {
        let payload = br#"{"statusCode": 520, "message": "Error unsupported namespace"}"#;
        let resp = handle_response(Ok(wrp_reply(payload, "application/json")));

        assert_eq!(resp.code.as_u16(), 520);
        assert_eq!(resp.body, &payload[..]);
        assert_eq!(resp.content_type(), Some("application/json"));
    }

    #[test]
    fn test_handle_response_undecodable_status_keeps_payload() {
        let resp = handle_response(Ok(wrp_reply(b"not json", "text/plain")));

        assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body, "not json");
        assert_eq!(resp.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_handle_response_bad_envelope() {
        let reply = DeviceReply::new(StatusCode::OK, None, "garbage");
        let resp = handle_response(Ok(reply));

        assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body, r#"{"message":""}"#);
    }

    #[test]
    fn test_handle_whole_response() {
        let reply = DeviceReply::new(
            StatusCode::OK,
            Some("application/json"),
            r#"{"id":"mac:112233445566"}"#,
        );
        let resp = handle_whole_response(Ok(reply.clone()));

        assert_eq!(resp.code, StatusCode::OK);
        assert_eq!(resp.body, reply.body);
        assert_eq!(resp.content_type(), Some("application/json"));

        let resp = handle_whole_response(Err(TransportError::Canceled));
        assert_eq!(resp.code, timeout_status());
    }

    #[test]
    fn test_into_http_response() {
        let mut resp = Tr1d1umResponse::new();
        write_response("", StatusCode::INTERNAL_SERVER_ERROR, &mut resp);

        let response = resp.into_http_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
    }
}
