//! Request validation ahead of conversion.

use std::collections::HashSet;

use tr1d1um_config::GatewaySettings;
use tr1d1um_convert::DeviceId;
use tr1d1um_extract::{ExtractionContext, DEVICE_ID_VAR, SERVICE_VAR};

use crate::error::{GatewayError, GatewayResult};

/// Checks the service and device addressed by a request.
///
/// # Example
///
/// ```
/// use tr1d1um::RequestValidator;
/// use tr1d1um_extract::ExtractionContext;
///
/// let validator = RequestValidator::new(["config"]);
/// let ctx = ExtractionContext::builder()
///     .path_var("deviceid", "mac:112233445566")
///     .path_var("service", "config")
///     .build();
///
/// let device = validator.validate(&ctx).unwrap();
/// assert_eq!(device.as_str(), "mac:112233445566");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestValidator {
    supported_services: HashSet<String>,
}

impl RequestValidator {
    /// Create a validator for the given services.
    pub fn new<I, S>(supported_services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_services: supported_services.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a validator from the gateway settings.
    pub fn from_config(settings: &GatewaySettings) -> Self {
        Self::new(settings.supported_services.iter().cloned())
    }

    /// Returns `true` if `service` may be addressed.
    pub fn is_supported_service(&self, service: &str) -> bool {
        self.supported_services.contains(service)
    }

    /// Checks the `service` path variable, then the device id.
    pub fn validate(&self, ctx: &ExtractionContext) -> GatewayResult<DeviceId> {
        let service = ctx.path_var(SERVICE_VAR).unwrap_or_default();
        if !self.is_supported_service(service) {
            return Err(GatewayError::unsupported_service(service));
        }

        self.validate_device(ctx)
    }

    /// Checks and canonicalizes the `deviceid` path variable.
    pub fn validate_device(&self, ctx: &ExtractionContext) -> GatewayResult<DeviceId> {
        let raw = ctx.required_path_var(DEVICE_ID_VAR)?;
        Ok(DeviceId::parse(raw)?)
    }
}
