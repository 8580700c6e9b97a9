mod device;
mod device_id;
mod factory;
mod mac_address;
mod repository;

pub use device::Device;
pub use device::DeviceRegistration;
pub use device_id::DeviceId;
pub use factory::DefaultDeviceFactory;
pub use factory::DeviceFactory;
#[cfg(test)]
pub use factory::MockDeviceFactory;
pub use mac_address::InvalidMacAddress;
pub use mac_address::MacAddress;
#[cfg(test)]
pub use repository::MockDeviceRepository;
pub use repository::DeviceRepository;
pub use repository::RepositoryError;
