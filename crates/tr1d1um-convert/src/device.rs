//! Device identifier canonicalization.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const MAC_LENGTH: usize = 12;
const MAC_DELIMITERS: &[char] = &[':', '-', '.', ','];

static ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn id_pattern() -> &'static Regex {
    ID_PATTERN.get_or_init(|| {
        Regex::new(r"^(?i:(mac|uuid|dns|serial)):([^/]+)(/[^/]+)?").expect("valid regex")
    })
}

/// Errors raised while parsing a device identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdError {
    /// The value is not `<prefix>:<id>` with a known prefix.
    #[error("invalid device name")]
    InvalidDeviceName,

    /// A MAC identifier contains a character that is neither hex nor a delimiter.
    #[error("invalid character in mac: {0}")]
    InvalidMacCharacter(char),

    /// A MAC identifier does not have exactly twelve hex digits.
    #[error("invalid length mac address: {0}")]
    InvalidMacLength(usize),
}

/// A canonical device identifier, `<prefix>:<id>`.
///
/// # Example
///
/// ```
/// use tr1d1um_convert::DeviceId;
///
/// let id = DeviceId::parse("MAC:11-22-33-AA-BB-CC/config").unwrap();
/// assert_eq!(id.as_str(), "mac:112233aabbcc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Parses and canonicalizes a device identifier.
    ///
    /// A trailing `/<service>` segment is accepted and dropped.
    pub fn parse(value: &str) -> Result<Self, DeviceIdError> {
        let captures = id_pattern()
            .captures(value)
            .ok_or(DeviceIdError::InvalidDeviceName)?;

        let prefix = captures[1].to_ascii_lowercase();
        let id = &captures[2];

        if prefix == "mac" {
            let mac = canonical_mac(id)?;
            return Ok(Self(format!("{prefix}:{mac}")));
        }

        Ok(Self(format!("{prefix}:{id}")))
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_mac(id: &str) -> Result<String, DeviceIdError> {
    let mut mac = String::with_capacity(MAC_LENGTH);
    for c in id.chars() {
        if c.is_ascii_hexdigit() {
            mac.push(c.to_ascii_lowercase());
        } else if !MAC_DELIMITERS.contains(&c) {
            return Err(DeviceIdError::InvalidMacCharacter(c));
        }
    }

    if mac.len() != MAC_LENGTH {
        return Err(DeviceIdError::InvalidMacLength(mac.len()));
    }
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mac_variants() {
        for raw in [
            "mac:112233445566",
            "MAC:11:22:33:44:55:66",
            "mac:11-22-33-44-55-66",
            "Mac:1122.3344.5566",
            "mac:112233445566/config",
        ] {
            assert_eq!(DeviceId::parse(raw).unwrap().as_str(), "mac:112233445566");
        }
    }

    #[test]
    fn test_parse_lowercases_hex() {
        let id = DeviceId::parse("mac:AABBCCDDEEFF").unwrap();
        assert_eq!(id.to_string(), "mac:aabbccddeeff");
    }

    #[test]
    fn test_parse_other_prefixes_keep_id() {
        assert_eq!(
            DeviceId::parse("UUID:Ab-Cd/service").unwrap().as_str(),
            "uuid:Ab-Cd"
        );
        assert_eq!(
            DeviceId::parse("dns:device.example.com").unwrap().into_string(),
            "dns:device.example.com"
        );
        assert_eq!(
            DeviceId::parse("serial:ABC123").unwrap().as_str(),
            "serial:ABC123"
        );
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        assert_eq!(
            DeviceId::parse("imei:112233445566"),
            Err(DeviceIdError::InvalidDeviceName)
        );
        assert_eq!(DeviceId::parse("mac:"), Err(DeviceIdError::InvalidDeviceName));
        assert_eq!(DeviceId::parse(""), Err(DeviceIdError::InvalidDeviceName));
    }

    #[test]
    fn test_parse_rejects_bad_mac() {
        assert_eq!(
            DeviceId::parse("mac:11223344556g"),
            Err(DeviceIdError::InvalidMacCharacter('g'))
        );
        assert_eq!(
            DeviceId::parse("mac:1122334455"),
            Err(DeviceIdError::InvalidMacLength(10))
        );
    }
}
