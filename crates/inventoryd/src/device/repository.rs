use std::path::PathBuf;

use async_trait::async_trait;

use super::Device;
use super::MacAddress;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The store already holds a device with this MAC address.
    #[error("a device with MAC address {0} is already stored")]
    DuplicateMacAddress(MacAddress),

    #[error("device store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device store {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to encode devices: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("device store lock poisoned")]
    Poisoned,
}

/// Durable device storage.
///
/// Implementations must enforce MAC uniqueness inside `save` itself: a lookup
/// followed by a save is not atomic, so two concurrent registrations of the
/// same address can both pass the lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn find_by_mac_address(
        &self,
        mac_address: &MacAddress,
    ) -> Result<Option<Device>, RepositoryError>;

    /// Persist a new device, or fail with
    /// [`RepositoryError::DuplicateMacAddress`] if its address is taken.
    async fn save(&self, device: Device) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}
