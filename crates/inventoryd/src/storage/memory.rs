use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use async_trait::async_trait;

use crate::device::Device;
use crate::device::DeviceRepository;
use crate::device::MacAddress;
use crate::device::RepositoryError;

/// Volatile device store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryDeviceRepository {
    devices: Mutex<HashMap<MacAddress, Device>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored device, in no particular order.
    ///
    /// Inspection helper for tests. It reads through a poisoned lock; the
    /// [`DeviceRepository`] methods report poisoning as an error instead.
    pub fn devices(&self) -> Vec<Device> {
        self.inspect().values().cloned().collect()
    }

    /// Number of stored devices. Reads through a poisoned lock like
    /// [`devices`](Self::devices).
    pub fn len(&self) -> usize {
        self.inspect().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn inspect(&self) -> MutexGuard<'_, HashMap<MacAddress, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn find_by_mac_address(
        &self,
        mac_address: &MacAddress,
    ) -> Result<Option<Device>, RepositoryError> {
        let devices = self.devices.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(devices.get(mac_address).cloned())
    }

    async fn save(&self, device: Device) -> Result<(), RepositoryError> {
        let mut devices = self.devices.lock().map_err(|_| RepositoryError::Poisoned)?;
        if devices.contains_key(&device.mac_address) {
            return Err(RepositoryError::DuplicateMacAddress(device.mac_address));
        }
        devices.insert(device.mac_address.clone(), device);
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let devices = self.devices.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(devices.len())
    }
}
