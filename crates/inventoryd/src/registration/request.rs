use serde_json::Map;
use serde_json::Value;

use super::RegistrationError;

pub const MAC_ADDRESS: &str = "macAddress";
pub const MODEL: &str = "model";
pub const FIRMWARE_VERSION: &str = "firmwareVersion";
pub const SERIAL_NUMBER: &str = "serialNumber";
pub const DISPLAY_NAME: &str = "displayName";
pub const LOCATION: &str = "location";
pub const TIMEZONE: &str = "timezone";

/// One field of an inbound request, before any validation.
///
/// Keeping "absent", "null" and "wrong type" apart lets validation report
/// them in the order the registration rules require instead of failing
/// wholesale at deserialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Missing,
    Null,
    Text(String),
    Other(Value),
}

impl FieldValue {
    /// JSON type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Missing => "nothing",
            FieldValue::Null => "null",
            FieldValue::Text(_) => "string",
            FieldValue::Other(Value::Bool(_)) => "boolean",
            FieldValue::Other(Value::Number(_)) => "number",
            FieldValue::Other(Value::Array(_)) => "array",
            FieldValue::Other(Value::Object(_)) => "object",
            FieldValue::Other(Value::String(_)) => "string",
            FieldValue::Other(Value::Null) => "null",
        }
    }
}

impl From<Option<Value>> for FieldValue {
    fn from(value: Option<Value>) -> Self {
        match value {
            None => FieldValue::Missing,
            Some(Value::Null) => FieldValue::Null,
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(other) => FieldValue::Other(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// A device registration request as received.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationRequest {
    pub mac_address: FieldValue,
    pub model: FieldValue,
    pub firmware_version: FieldValue,
    pub serial_number: FieldValue,
    pub display_name: FieldValue,
    pub location: FieldValue,
    pub timezone: FieldValue,
}

impl RegistrationRequest {
    /// A request with the four required fields set to strings.
    pub fn new(
        mac_address: impl Into<FieldValue>,
        model: impl Into<FieldValue>,
        firmware_version: impl Into<FieldValue>,
        serial_number: impl Into<FieldValue>,
    ) -> Self {
        Self {
            mac_address: mac_address.into(),
            model: model.into(),
            firmware_version: firmware_version.into(),
            serial_number: serial_number.into(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, value: impl Into<FieldValue>) -> Self {
        self.display_name = value.into();
        self
    }

    pub fn with_location(mut self, value: impl Into<FieldValue>) -> Self {
        self.location = value.into();
        self
    }

    pub fn with_timezone(mut self, value: impl Into<FieldValue>) -> Self {
        self.timezone = value.into();
        self
    }

    /// Read a request from a decoded JSON body. Unknown keys are ignored.
    pub fn from_json(body: Value) -> Result<Self, RegistrationError> {
        match body {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(RegistrationError::InvalidInput(format!(
                "request body must be a JSON object, got {}",
                FieldValue::from(Some(other)).type_name()
            ))),
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let mut take = |key: &str| FieldValue::from(map.remove(key));
        Self {
            mac_address: take(MAC_ADDRESS),
            model: take(MODEL),
            firmware_version: take(FIRMWARE_VERSION),
            serial_number: take(SERIAL_NUMBER),
            display_name: take(DISPLAY_NAME),
            location: take(LOCATION),
            timezone: take(TIMEZONE),
        }
    }

    /// Required fields in the order they are checked.
    pub(crate) fn required_fields(&self) -> [(&'static str, &FieldValue); 4] {
        [
            (MAC_ADDRESS, &self.mac_address),
            (MODEL, &self.model),
            (FIRMWARE_VERSION, &self.firmware_version),
            (SERIAL_NUMBER, &self.serial_number),
        ]
    }
}
