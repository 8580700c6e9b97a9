use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::device::Device;
use crate::device::DeviceRepository;
use crate::device::MacAddress;
use crate::device::RepositoryError;

/// Device store backed by a single JSON file.
///
/// The whole inventory is held in memory and the file is rewritten on every
/// save. Writes go to a temporary sibling first and are renamed into place,
/// so a crash mid-write leaves the previous inventory intact.
#[derive(Debug)]
pub struct JsonFileDeviceRepository {
    path: PathBuf,
    devices: Mutex<HashMap<MacAddress, Device>>,
}

impl JsonFileDeviceRepository {
    /// Open the store at `path`, loading existing devices. A missing file is
    /// an empty inventory.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RepositoryError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let devices = match tokio::fs::read(&path).await {
            Ok(bytes) => Self::decode(&path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };

        tracing::debug!("Loaded {} device(s) from {}", devices.len(), path.display());

        Ok(Self {
            path,
            devices: Mutex::new(devices),
        })
    }

    pub async fn len(&self) -> usize {
        self.devices.lock().await.len()
    }

    fn decode(path: &Path, bytes: &[u8]) -> Result<HashMap<MacAddress, Device>, RepositoryError> {
        let list: Vec<Device> =
            serde_json::from_slice(bytes).map_err(|e| RepositoryError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut devices = HashMap::with_capacity(list.len());
        for device in list {
            let mac_address = device.mac_address.clone();
            if devices.insert(mac_address.clone(), device).is_some() {
                return Err(RepositoryError::Corrupt {
                    path: path.to_path_buf(),
                    reason: format!("MAC address {} appears more than once", mac_address),
                });
            }
        }

        Ok(devices)
    }

    async fn persist(&self, devices: &HashMap<MacAddress, Device>) -> Result<(), RepositoryError> {
        let mut list: Vec<&Device> = devices.values().collect();
        list.sort_by(|a, b| a.mac_address.cmp(&b.mac_address));
        let bytes = serde_json::to_vec_pretty(&list)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "devices.json".to_string());
        let tmp_path = self.path.with_file_name(format!(".{}.tmp", file_name));

        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| RepositoryError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| RepositoryError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl DeviceRepository for JsonFileDeviceRepository {
    async fn find_by_mac_address(
        &self,
        mac_address: &MacAddress,
    ) -> Result<Option<Device>, RepositoryError> {
        Ok(self.devices.lock().await.get(mac_address).cloned())
    }

    async fn save(&self, device: Device) -> Result<(), RepositoryError> {
        let mut devices = self.devices.lock().await;
        if devices.contains_key(&device.mac_address) {
            return Err(RepositoryError::DuplicateMacAddress(device.mac_address));
        }

        let mac_address = device.mac_address.clone();
        devices.insert(mac_address.clone(), device);

        if let Err(e) = self.persist(&devices).await {
            devices.remove(&mac_address);
            return Err(e);
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.devices.lock().await.len())
    }
}
