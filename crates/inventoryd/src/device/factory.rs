use super::Device;
use super::DeviceId;
use super::DeviceRegistration;

/// Builds the device aggregate from validated fields and a fresh id.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceFactory: Send + Sync {
    fn create_device(&self, device_id: DeviceId, registration: DeviceRegistration) -> Device;
}

/// Copies the registration fields onto the device unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDeviceFactory;

impl DeviceFactory for DefaultDeviceFactory {
    fn create_device(&self, device_id: DeviceId, registration: DeviceRegistration) -> Device {
        let DeviceRegistration {
            mac_address,
            model,
            firmware_version,
            serial_number,
            display_name,
            location,
            timezone,
        } = registration;

        Device {
            device_id,
            mac_address,
            model,
            firmware_version,
            serial_number,
            display_name,
            location,
            timezone,
        }
    }
}
