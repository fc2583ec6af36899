//! Device-facing transport.
//!
//! A [`Sender`] delivers one WRP envelope to the device transport and
//! returns its raw reply. [`HttpSender`] is the production implementation;
//! tests substitute in-process fakes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use thiserror::Error;
use tr1d1um_config::GatewaySettings;
use tr1d1um_core::wrp::JSON_CONTENT_TYPE;
use tr1d1um_core::Message;

/// Path of the device endpoint below the target URL.
pub const DEVICE_PATH: &str = "/api/v2/device";

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while talking to the device transport.
///
/// The display text of the timeout-class variants is what
/// [`report_error`](crate::report_error) keys on.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller gave up on the request.
    #[error("context canceled")]
    Canceled,

    /// The per-attempt response deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The HTTP client's own timeout fired.
    #[error("request to {url} failed (Client.Timeout exceeded while awaiting headers)")]
    ClientTimeout {
        /// Target of the timed out call.
        url: String,
    },

    /// Any other failure of the HTTP call.
    #[error("request failed: {message}")]
    Request {
        /// Error message.
        message: String,
    },

    /// The envelope could not be encoded.
    #[error("failed to encode WRP message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP client could not be built.
    #[error("failed to create client: {message}")]
    Client {
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Create a generic request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Returns `true` for failures that belong to the timeout class.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Canceled | Self::DeadlineExceeded | Self::ClientTimeout { .. }
        )
    }

    /// Returns `true` for failures raised before anything reached the wire.
    ///
    /// Internal failures stop the retry loop instead of being retried.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Encode(_) | Self::Client { .. })
    }

    fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::ClientTimeout {
                url: url.to_owned(),
            }
        } else {
            Self::request(error.to_string())
        }
    }
}

/// Raw reply from the device transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReply {
    /// HTTP status of the transport reply.
    pub status: StatusCode,
    /// `Content-Type` of the transport reply, if any.
    pub content_type: Option<String>,
    /// Reply body.
    pub body: Bytes,
}

impl DeviceReply {
    /// Create a reply.
    pub fn new(status: StatusCode, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_owned),
            body: body.into(),
        }
    }
}

/// Delivers envelopes to devices.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Sends one WRP envelope and waits for the device reply.
    async fn send(&self, message: &Message) -> TransportResult<DeviceReply>;

    /// Fetches the connection statistics of a device.
    async fn get_stat(
        &self,
        device_id: &str,
        authorization: Option<&str>,
    ) -> TransportResult<DeviceReply>;
}

/// [`Sender`] that posts JSON envelopes over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: Client,
    target_url: String,
    resp_wait_timeout: Duration,
}

impl HttpSender {
    /// Create a sender from explicit parts.
    pub fn new(client: Client, target_url: impl Into<String>, resp_wait_timeout: Duration) -> Self {
        Self {
            client,
            target_url: target_url.into().trim_end_matches('/').to_owned(),
            resp_wait_timeout,
        }
    }

    /// Create a sender from the gateway settings.
    pub fn from_config(settings: &GatewaySettings) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(settings.client_timeout)
            .connect_timeout(settings.net_dialer_timeout)
            .build()
            .map_err(|e| TransportError::Client {
                message: e.to_string(),
            })?;

        Ok(Self::new(
            client,
            &settings.target_url,
            settings.resp_wait_timeout,
        ))
    }

    /// URL envelopes are posted to.
    pub fn device_url(&self) -> String {
        format!("{}{DEVICE_PATH}", self.target_url)
    }

    /// URL of the stat endpoint of one device.
    pub fn stat_url(&self, device_id: &str) -> String {
        format!("{}{DEVICE_PATH}/{device_id}/stat", self.target_url)
    }

    /// Get the per-attempt response deadline.
    pub fn resp_wait_timeout(&self) -> Duration {
        self.resp_wait_timeout
    }

    async fn execute(&self, url: &str, request: RequestBuilder) -> TransportResult<DeviceReply> {
        let call = async {
            let response = request
                .send()
                .await
                .map_err(|e| TransportError::from_reqwest(url, &e))?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::from_reqwest(url, &e))?;

            Ok(DeviceReply {
                status,
                content_type,
                body,
            })
        };

        tokio::time::timeout(self.resp_wait_timeout, call)
            .await
            .map_err(|_| TransportError::DeadlineExceeded)?
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, message: &Message) -> TransportResult<DeviceReply> {
        let body = message.encode()?;
        let url = self.device_url();

        tracing::debug!(
            dest = %message.dest,
            transaction_id = %message.transaction_uuid,
            "sending WRP message"
        );

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);

        self.execute(&url, request).await
    }

    async fn get_stat(
        &self,
        device_id: &str,
        authorization: Option<&str>,
    ) -> TransportResult<DeviceReply> {
        let url = self.stat_url(device_id);

        let mut request = self.client.get(&url);
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        self.execute(&url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(TransportError::Canceled.to_string(), "context canceled");
        assert_eq!(
            TransportError::DeadlineExceeded.to_string(),
            "context deadline exceeded"
        );
        let timeout = TransportError::ClientTimeout {
            url: "http://localhost:6000/api/v2/device".into(),
        };
        assert!(timeout.to_string().contains("Client.Timeout exceeded"));
    }

    #[test]
    fn test_error_classes() {
        assert!(TransportError::Canceled.is_timeout());
        assert!(TransportError::DeadlineExceeded.is_timeout());
        assert!(!TransportError::request("connection refused").is_timeout());
        assert!(!TransportError::request("connection refused").is_internal());

        let encode = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(TransportError::from(encode).is_internal());
    }

    #[test]
    fn test_urls() {
        let sender = HttpSender::new(
            Client::new(),
            "https://talaria.example.com:6200/",
            Duration::from_secs(1),
        );

        assert_eq!(
            sender.device_url(),
            "https://talaria.example.com:6200/api/v2/device"
        );
        assert_eq!(
            sender.stat_url("mac:112233445566"),
            "https://talaria.example.com:6200/api/v2/device/mac:112233445566/stat"
        );
        assert_eq!(sender.resp_wait_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_from_config() {
        let settings = GatewaySettings::default();
        let sender = HttpSender::from_config(&settings).unwrap();

        assert_eq!(sender.device_url(), "http://localhost:6000/api/v2/device");
        assert_eq!(sender.resp_wait_timeout(), settings.resp_wait_timeout);
    }

    #[tokio::test]
    async fn test_unreachable_target_is_a_transport_error() {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let sender = HttpSender::new(client, "http://127.0.0.1:9", Duration::from_secs(5));

        let message = Message {
            message_type: tr1d1um_core::MessageType::SimpleRequestResponse,
            content_type: String::new(),
            payload: Bytes::from_static(b"{}"),
            source: "dns:tr1d1um/config".into(),
            dest: "mac:112233445566/config".into(),
            transaction_uuid: "tid".into(),
        };

        let error = sender.send(&message).await.unwrap_err();
        assert!(!error.is_internal());
    }
}
