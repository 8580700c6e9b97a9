use serde::Deserialize;
use serde::Serialize;

use super::DeviceId;
use super::MacAddress;

/// A registered device.
///
/// Devices are created once by registration and never modified afterwards.
/// The serialized form (camelCase) is also the on-disk format of the JSON
/// file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: DeviceId,
    pub mac_address: MacAddress,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Registration fields that passed validation, ready to become a [`Device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub mac_address: MacAddress,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub display_name: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
}
