//! [`DeviceRepository`](crate::device::DeviceRepository) implementations.

mod json_file;
mod memory;

pub use json_file::JsonFileDeviceRepository;
pub use memory::InMemoryDeviceRepository;
