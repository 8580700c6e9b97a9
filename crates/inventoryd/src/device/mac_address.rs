use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// Six colon-separated two-digit hex groups, e.g. `AA:BB:CC:DD:EE:FF`.
static MAC_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("MAC address pattern is valid")
});

/// A hardware address in canonical upper-case form.
///
/// Two addresses that differ only in hex digit case are the same address, so
/// the canonical form is what gets hashed, compared and stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a MAC address (expected XX:XX:XX:XX:XX:XX)")]
pub struct InvalidMacAddress(pub String);

impl MacAddress {
    pub fn parse(raw: &str) -> Result<Self, InvalidMacAddress> {
        if MAC_FORMAT.is_match(raw) {
            Ok(Self(raw.to_ascii_uppercase()))
        } else {
            Err(InvalidMacAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = InvalidMacAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
