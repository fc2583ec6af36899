//! Main configuration types.

use serde::{Deserialize, Serialize};
use tr1d1um_telemetry::LogConfig;

use crate::{ConfigError, GatewaySettings, LogFormat, LoggingSettings, ReadSettings};

/// Complete tr1d1um configuration.
///
/// Process configuration is read-only once loaded. Use
/// [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use tr1d1um_config::Tr1d1umConfig;
///
/// let config = Tr1d1umConfig::default();
/// assert_eq!(config.gateway.max_retries, 2);
/// assert_eq!(config.read.names_separator, ",");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct Tr1d1umConfig {
    /// Transport target and call bounds.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Read request form keys.
    #[serde(default)]
    pub read: ReadSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Tr1d1umConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The target URL is not http(s)
    /// - The WRP source is empty
    /// - The names separator is empty
    /// - No service is supported
    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = self.gateway.target_url.as_str();
        let has_host = target
            .strip_prefix("http://")
            .or_else(|| target.strip_prefix("https://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(ConfigError::invalid_value(
                "gateway.target_url",
                format!("expected an http(s) URL, got {target:?}"),
            ));
        }

        if self.gateway.wrp_source.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "gateway.wrp_source",
                "must not be empty",
            ));
        }

        if self.gateway.supported_services.iter().all(String::is_empty) {
            return Err(ConfigError::invalid_value(
                "gateway.supported_services",
                "at least one service is required",
            ));
        }

        if self.read.names_separator.is_empty() {
            return Err(ConfigError::invalid_value(
                "read.names_separator",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use tr1d1um_config::{LogFormat, Tr1d1umConfig};
    ///
    /// let config = Tr1d1umConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.file_line_info = true;
        config
    }

    /// Production preset: JSON logs at info level.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}

impl From<&LoggingSettings> for LogConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            enabled: settings.enabled,
            level: settings.level.clone(),
            json_format: settings.format == LogFormat::Json,
            file_line_info: settings.file_line_info,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Tr1d1umConfig::default().validate().is_ok());
        assert!(Tr1d1umConfig::development().validate().is_ok());
        assert!(Tr1d1umConfig::production().validate().is_ok());
    }

    #[test]
    fn test_validate_target_url() {
        for url in ["localhost:6000", "ftp://host", "http://", ""] {
            let mut config = Tr1d1umConfig::default();
            config.gateway.target_url = url.to_string();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidValue { ref field, .. }) if field == "gateway.target_url"),
                "{url} should be rejected"
            );
        }

        let mut config = Tr1d1umConfig::default();
        config.gateway.target_url = "https://talaria.example.com:8080".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_wrp_source() {
        let mut config = Tr1d1umConfig::default();
        config.gateway.wrp_source = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_supported_services() {
        let mut config = Tr1d1umConfig::default();
        config.gateway.supported_services.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_separator() {
        let mut config = Tr1d1umConfig::default();
        config.read.names_separator.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_config_from_settings() {
        let config = Tr1d1umConfig::development();
        let log_config = LogConfig::from(&config.logging);

        assert!(log_config.enabled);
        assert!(!log_config.json_format);
        assert!(log_config.file_line_info);
        assert_eq!(log_config.level, "debug");

        let log_config = LogConfig::from(&LoggingSettings::default());
        assert!(log_config.json_format);
        assert_eq!(log_config.level, "info");
    }
}
