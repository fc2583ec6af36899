//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Gateway section: where envelopes go and how calls are bounded.
///
/// # Example
///
/// ```
/// use tr1d1um_config::GatewaySettings;
/// use std::time::Duration;
///
/// let settings = GatewaySettings::default();
/// assert_eq!(settings.target_url, "http://localhost:6000");
/// assert_eq!(settings.retry_interval, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatewaySettings {
    /// Base URL of the device-facing transport.
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Source root stamped on every outbound envelope.
    #[serde(default = "default_wrp_source")]
    pub wrp_source: String,

    /// Services a request may address.
    #[serde(default = "default_supported_services")]
    pub supported_services: Vec<String>,

    /// Overall timeout of one HTTP call to the transport.
    #[serde(default = "default_client_timeout", with = "duration")]
    pub client_timeout: Duration,

    /// Deadline for a device reply within one attempt.
    #[serde(default = "default_resp_wait_timeout", with = "duration")]
    pub resp_wait_timeout: Duration,

    /// TCP connect timeout.
    #[serde(default = "default_net_dialer_timeout", with = "duration")]
    pub net_dialer_timeout: Duration,

    /// Wait between retry attempts.
    #[serde(default = "default_retry_interval", with = "duration")]
    pub retry_interval: Duration,

    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            wrp_source: default_wrp_source(),
            supported_services: default_supported_services(),
            client_timeout: default_client_timeout(),
            resp_wait_timeout: default_resp_wait_timeout(),
            net_dialer_timeout: default_net_dialer_timeout(),
            retry_interval: default_retry_interval(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_target_url() -> String {
    "http://localhost:6000".to_string()
}

fn default_wrp_source() -> String {
    "dns:tr1d1um.example.com".to_string()
}

fn default_supported_services() -> Vec<String> {
    vec!["config".to_string()]
}

fn default_client_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_resp_wait_timeout() -> Duration {
    Duration::from_secs(40)
}

fn default_net_dialer_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_max_retries() -> u32 {
    2
}

/// Read section: form keys of a `GET` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReadSettings {
    /// Form key holding the parameter names.
    #[serde(default = "default_names_key")]
    pub names_key: String,

    /// Form key holding the attribute selector.
    #[serde(default = "default_attributes_key")]
    pub attributes_key: String,

    /// Separator between parameter names.
    #[serde(default = "default_names_separator")]
    pub names_separator: String,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            names_key: default_names_key(),
            attributes_key: default_attributes_key(),
            names_separator: default_names_separator(),
        }
    }
}

fn default_names_key() -> String {
    "names".to_string()
}

fn default_attributes_key() -> String {
    "attributes".to_string()
}

fn default_names_separator() -> String {
    ",".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info", "tr1d1um=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in log records.
    #[serde(default)]
    pub file_line_info: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            file_line_info: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (production).
    #[default]
    Json,
    /// Human-readable format (development).
    Pretty,
}

impl LogFormat {
    /// Parses a format name, ignoring case.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Durations as `"<n>ms"`, `"<n>s"`, `"<n>m"`, `"<n>h"` or bare seconds.
pub(crate) mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let invalid = || format!("invalid duration: {s:?}");

        let (number, unit_secs, millis) = if let Some(n) = s.strip_suffix("ms") {
            (n, 0, true)
        } else if let Some(n) = s.strip_suffix('s') {
            (n, 1, false)
        } else if let Some(n) = s.strip_suffix('m') {
            (n, 60, false)
        } else if let Some(n) = s.strip_suffix('h') {
            (n, 3600, false)
        } else {
            (s, 1, false)
        };

        let n: u64 = number.trim().parse().map_err(|_| invalid())?;
        if millis {
            Ok(Duration::from_millis(n))
        } else {
            n.checked_mul(unit_secs)
                .map(Duration::from_secs)
                .ok_or_else(invalid)
        }
    }
}
