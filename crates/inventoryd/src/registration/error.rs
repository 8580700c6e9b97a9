use crate::device::MacAddress;
use crate::device::RepositoryError;

/// Why a registration did not go through.
///
/// The first three variants reject the request itself and are deterministic
/// for a given input and inventory. `Repository` is a storage failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// A required field is missing or blank, a field has the wrong type, or
    /// the body is not an object.
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid MAC address '{0}': expected six colon-separated hex pairs (XX:XX:XX:XX:XX:XX)")]
    InvalidMacAddress(String),

    #[error("a device with MAC address {0} is already registered")]
    DuplicateMacAddress(MacAddress),

    #[error("device storage failed: {0}")]
    Repository(#[source] RepositoryError),
}

impl RegistrationError {
    /// True for errors caused by the request rather than by the server.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, RegistrationError::Repository(_))
    }
}

/// A uniqueness violation reported by the store is the same conflict the
/// lookup would have reported, just detected later.
impl From<RepositoryError> for RegistrationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::DuplicateMacAddress(mac) => RegistrationError::DuplicateMacAddress(mac),
            other => RegistrationError::Repository(other),
        }
    }
}
