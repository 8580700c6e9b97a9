//! Device registration: request validation, MAC uniqueness, persistence.

mod error;
pub mod request;
mod service;
pub mod validation;

pub use error::RegistrationError;
pub use request::FieldValue;
pub use request::RegistrationRequest;
pub use service::DeviceRegistrationService;
pub use service::RegistrationReceipt;
pub use service::REGISTERED_MESSAGE;
