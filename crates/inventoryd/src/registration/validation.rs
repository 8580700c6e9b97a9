//! Field checks applied to a [`RegistrationRequest`].
//!
//! Each step returns the first problem it finds. The service runs them in a
//! fixed order: required fields, MAC format, (uniqueness), field types.

use crate::device::DeviceRegistration;
use crate::device::MacAddress;

use super::request;
use super::FieldValue;
use super::RegistrationError;
use super::RegistrationRequest;

/// Required fields must be present, non-null and, when strings, not blank.
///
/// A required field holding some other JSON type passes here; its type is
/// checked later.
pub fn check_required(request: &RegistrationRequest) -> Result<(), RegistrationError> {
    for (name, value) in request.required_fields() {
        match value {
            FieldValue::Missing => {
                return Err(RegistrationError::InvalidInput(format!(
                    "missing required field '{}'",
                    name
                )));
            }
            FieldValue::Null => {
                return Err(RegistrationError::InvalidInput(format!(
                    "required field '{}' must not be null",
                    name
                )));
            }
            FieldValue::Text(s) if s.trim().is_empty() => {
                return Err(RegistrationError::InvalidInput(format!(
                    "required field '{}' must not be blank",
                    name
                )));
            }
            FieldValue::Text(_) | FieldValue::Other(_) => {}
        }
    }
    Ok(())
}

/// The MAC address must be a string in `XX:XX:XX:XX:XX:XX` form. It is not
/// trimmed.
pub fn check_mac_address(value: &FieldValue) -> Result<MacAddress, RegistrationError> {
    match value {
        FieldValue::Text(raw) => MacAddress::parse(raw)
            .map_err(|_| RegistrationError::InvalidMacAddress(raw.clone())),
        other => Err(wrong_type(request::MAC_ADDRESS, other)),
    }
}

/// Every remaining field, if set, must be a string. Values are kept exactly as
/// submitted; only an absent or null optional field becomes unset.
pub fn check_types(
    request: RegistrationRequest,
    mac_address: MacAddress,
) -> Result<DeviceRegistration, RegistrationError> {
    let RegistrationRequest {
        mac_address: _,
        model,
        firmware_version,
        serial_number,
        display_name,
        location,
        timezone,
    } = request;

    Ok(DeviceRegistration {
        mac_address,
        model: required_text(request::MODEL, model)?,
        firmware_version: required_text(request::FIRMWARE_VERSION, firmware_version)?,
        serial_number: required_text(request::SERIAL_NUMBER, serial_number)?,
        display_name: optional_text(request::DISPLAY_NAME, display_name)?,
        location: optional_text(request::LOCATION, location)?,
        timezone: optional_text(request::TIMEZONE, timezone)?,
    })
}

fn required_text(name: &str, value: FieldValue) -> Result<String, RegistrationError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(wrong_type(name, &other)),
    }
}

fn optional_text(name: &str, value: FieldValue) -> Result<Option<String>, RegistrationError> {
    match value {
        FieldValue::Missing | FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s)),
        other => Err(wrong_type(name, &other)),
    }
}

fn wrong_type(name: &str, value: &FieldValue) -> RegistrationError {
    RegistrationError::InvalidInput(format!(
        "field '{}' must be a string, got {}",
        name,
        value.type_name()
    ))
}
