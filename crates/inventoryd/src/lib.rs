pub mod api;
pub mod config;
pub mod device;
pub mod logging;
pub mod registration;
pub mod storage;

pub use config::Config;
pub use config::LogLevel;
pub use device::Device;
pub use device::DeviceId;
pub use device::DeviceRepository;
pub use device::MacAddress;
pub use registration::DeviceRegistrationService;
pub use registration::RegistrationError;
pub use registration::RegistrationRequest;
