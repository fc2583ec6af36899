//! WRP envelope composition.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use rand::rngs::OsRng;
use rand::RngCore;
use tr1d1um_core::{Message, MessageType};
use tr1d1um_extract::{PathVars, DEVICE_ID_VAR, SERVICE_VAR};

use crate::{ConversionWdmp, DeviceId};

/// Header carrying a caller-supplied transaction id.
pub const HEADER_TRANSACTION_ID: &str = "X-WebPA-Transaction-Id";

const TRANSACTION_ID_BYTES: usize = 16;

impl ConversionWdmp {
    /// Wraps a serialized command into a WRP request addressed to the
    /// device and service named by the path variables.
    ///
    /// Composition never fails. An unparsable device id is used verbatim
    /// and an RNG failure leaves the transaction id empty; both are logged.
    pub fn configured_wrp(
        &self,
        payload: impl Into<bytes::Bytes>,
        vars: &PathVars,
        headers: &HeaderMap,
    ) -> Message {
        let raw_id = vars.get(DEVICE_ID_VAR).unwrap_or_default();
        let service = vars.get(SERVICE_VAR).unwrap_or_default();

        let device_id = match DeviceId::parse(raw_id) {
            Ok(id) => id.into_string(),
            Err(error) => {
                tracing::warn!(device_id = %raw_id, %error, "using raw device id for WRP destination");
                raw_id.to_owned()
            }
        };

        Message {
            message_type: MessageType::SimpleRequestResponse,
            content_type: header_str(headers, CONTENT_TYPE.as_str())
                .unwrap_or_default()
                .to_owned(),
            payload: payload.into(),
            source: format!("{}/{service}", self.wrp_source()),
            dest: format!("{device_id}/{service}"),
            transaction_uuid: get_or_gen_tid(headers),
        }
    }
}

/// Returns the caller's transaction id, or a fresh random one.
///
/// # Example
///
/// ```
/// use http::{HeaderMap, HeaderValue};
/// use tr1d1um_convert::get_or_gen_tid;
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(get_or_gen_tid(&headers).len(), 22);
///
/// headers.insert("x-webpa-transaction-id", HeaderValue::from_static("tid-1"));
/// assert_eq!(get_or_gen_tid(&headers), "tid-1");
/// ```
pub fn get_or_gen_tid(headers: &HeaderMap) -> String {
    if let Some(tid) = header_str(headers, HEADER_TRANSACTION_ID) {
        return tid.to_owned();
    }

    match generate_tid() {
        Ok(tid) => tid,
        Err(error) => {
            tracing::warn!(%error, "failed to generate transaction id");
            String::new()
        }
    }
}

fn generate_tid() -> Result<String, rand::Error> {
    let mut bytes = [0u8; TRANSACTION_ID_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn vars(device_id: &str) -> PathVars {
        [(DEVICE_ID_VAR, device_id), (SERVICE_VAR, "config")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_configured_wrp_addresses() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("x-webpa-transaction-id", HeaderValue::from_static("tid"));

        let conversion = ConversionWdmp::new("dns:tr1d1um.example.com");
        let message = conversion.configured_wrp(
            b"{}".to_vec(),
            &vars("MAC:11:22:33:44:55:66"),
            &headers,
        );

        assert_eq!(message.message_type, MessageType::SimpleRequestResponse);
        assert_eq!(message.source, "dns:tr1d1um.example.com/config");
        assert_eq!(message.dest, "mac:112233445566/config");
        assert_eq!(message.content_type, "application/json");
        assert_eq!(message.transaction_uuid, "tid");
        assert_eq!(message.payload.as_ref(), b"{}");
    }

    #[test]
    fn test_configured_wrp_falls_back_to_raw_id() {
        let conversion = ConversionWdmp::new("dns:gw");
        let message = conversion.configured_wrp(Vec::new(), &vars("bogus"), &HeaderMap::new());

        assert_eq!(message.dest, "bogus/config");
        assert!(message.content_type.is_empty());
        assert!(!message.transaction_uuid.is_empty());
    }

    #[test]
    fn test_configured_wrp_without_vars() {
        let conversion = ConversionWdmp::new("dns:gw");
        let message = conversion.configured_wrp(Vec::new(), &PathVars::new(), &HeaderMap::new());

        assert_eq!(message.source, "dns:gw/");
        assert_eq!(message.dest, "/");
    }

    #[test]
    fn test_generated_tids_are_url_safe_and_unique() {
        let first = get_or_gen_tid(&HeaderMap::new());
        let second = get_or_gen_tid(&HeaderMap::new());

        assert_eq!(first.len(), 22);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_tid_header_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert("x-webpa-transaction-id", HeaderValue::from_static(""));
        assert_eq!(get_or_gen_tid(&headers).len(), 22);
    }
}
