//! WRP envelope model.
//!
//! A WRP [`Message`] routes a WDMP payload to one service on one device.
//! On the wire it is a JSON object whose payload is standard base64.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content type of a JSON-encoded WRP message or WDMP payload.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// WRP message types understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MessageType {
    /// Request that expects exactly one response.
    SimpleRequestResponse,
    /// Fire-and-forget event.
    SimpleEvent,
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::SimpleRequestResponse => 3,
            MessageType::SimpleEvent => 4,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::SimpleRequestResponse),
            4 => Ok(Self::SimpleEvent),
            other => Err(format!("unsupported WRP message type: {other}")),
        }
    }
}

/// A WRP envelope.
///
/// # Example
///
/// ```
/// use tr1d1um_core::{Message, MessageType};
///
/// let message = Message {
///     message_type: MessageType::SimpleRequestResponse,
///     content_type: "application/json".into(),
///     payload: bytes::Bytes::from_static(b"{}"),
///     source: "dns:gateway/config".into(),
///     dest: "mac:112233445566/config".into(),
///     transaction_uuid: "tid".into(),
/// };
///
/// let encoded = message.encode().unwrap();
/// assert_eq!(Message::decode(&encoded).unwrap(), message);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message type.
    #[serde(rename = "msg_type")]
    pub message_type: MessageType,
    /// Content type of `payload`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    /// Opaque payload.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Bytes::is_empty")]
    pub payload: Bytes,
    /// `<source root>/<service>`.
    #[serde(default)]
    pub source: String,
    /// `<device id>/<service>`.
    #[serde(default)]
    pub dest: String,
    /// Correlation identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_uuid: String,
}

impl Message {
    /// Encodes the message as JSON.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes a JSON-encoded message.
    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(payload: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(payload))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
