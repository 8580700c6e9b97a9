use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::device::DefaultDeviceFactory;
use crate::device::DeviceFactory;
use crate::device::DeviceId;
use crate::device::DeviceRepository;

use super::validation;
use super::RegistrationError;
use super::RegistrationRequest;

/// Confirmation text returned with every successful registration.
pub const REGISTERED_MESSAGE: &str = "Device registered";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub device_id: DeviceId,
    pub message: String,
}

/// Registers devices into the inventory.
///
/// Holds no state of its own between calls; the repository is the only shared
/// resource and is injected by whoever builds the service.
pub struct DeviceRegistrationService {
    repository: Arc<dyn DeviceRepository>,
    factory: Arc<dyn DeviceFactory>,
}

impl DeviceRegistrationService {
    pub fn new(repository: Arc<dyn DeviceRepository>, factory: Arc<dyn DeviceFactory>) -> Self {
        Self {
            repository,
            factory,
        }
    }

    pub fn with_default_factory(repository: Arc<dyn DeviceRepository>) -> Self {
        Self::new(repository, Arc::new(DefaultDeviceFactory))
    }

    pub fn repository(&self) -> &Arc<dyn DeviceRepository> {
        &self.repository
    }

    /// Validate `request`, make sure its MAC address is free, then build and
    /// save the device.
    ///
    /// Nothing is written unless every check passes, and `save` is called at
    /// most once.
    #[tracing::instrument(skip_all)]
    pub async fn register_device(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let result = self.try_register(request).await;
        match &result {
            Ok(receipt) => info!(device_id = %receipt.device_id, "Device registered"),
            Err(e) if e.is_rejection() => debug!(error = %e, "Registration rejected"),
            Err(e) => warn!(error = %e, "Registration failed"),
        }
        result
    }

    async fn try_register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        validation::check_required(&request)?;
        let mac_address = validation::check_mac_address(&request.mac_address)?;

        if self
            .repository
            .find_by_mac_address(&mac_address)
            .await?
            .is_some()
        {
            return Err(RegistrationError::DuplicateMacAddress(mac_address));
        }

        let registration = validation::check_types(request, mac_address)?;

        let device_id = DeviceId::generate();
        debug!(%device_id, mac_address = %registration.mac_address, "Creating device");
        let device = self.factory.create_device(device_id, registration);

        // The store rejects a MAC that was taken since the lookup above.
        self.repository.save(device).await?;

        Ok(RegistrationReceipt {
            device_id,
            message: REGISTERED_MESSAGE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::device::Device;
    use crate::device::MacAddress;
    use crate::device::MockDeviceFactory;
    use crate::device::MockDeviceRepository;
    use crate::device::RepositoryError;
    use crate::registration::FieldValue;
    use crate::storage::InMemoryDeviceRepository;

    fn valid_request() -> RegistrationRequest {
        RegistrationRequest::new("AA:BB:CC:DD:EE:FF", "X1", "1.0", "SN123")
            .with_display_name(FieldValue::Null)
            .with_location("room1")
            .with_timezone("UTC")
    }

    fn existing_device() -> Device {
        Device {
            device_id: DeviceId::generate(),
            mac_address: MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(),
            model: "Old".to_string(),
            firmware_version: "0.1".to_string(),
            serial_number: "SN000".to_string(),
            display_name: None,
            location: None,
            timezone: None,
        }
    }

    fn service(repo: MockDeviceRepository) -> DeviceRegistrationService {
        DeviceRegistrationService::with_default_factory(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_register_device_success() {
        let saved = Arc::new(Mutex::new(None::<Device>));
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address()
            .withf(|mac| mac.as_str() == "AA:BB:CC:DD:EE:FF")
            .times(1)
            .returning(|_| Ok(None));
        let sink = Arc::clone(&saved);
        repo.expect_save().times(1).returning(move |device| {
            *sink.lock().unwrap() = Some(device);
            Ok(())
        });

        let receipt = service(repo).register_device(valid_request()).await.unwrap();

        let device = saved.lock().unwrap().take().unwrap();
        assert_eq!(receipt.device_id, device.device_id);
        assert_eq!(receipt.message, REGISTERED_MESSAGE);
        assert_eq!(device.mac_address.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(device.model, "X1");
        assert_eq!(device.firmware_version, "1.0");
        assert_eq!(device.serial_number, "SN123");
        assert_eq!(device.display_name, None);
        assert_eq!(device.location.as_deref(), Some("room1"));
        assert_eq!(device.timezone.as_deref(), Some("UTC"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_required_field_never_touches_repository() {
        let cases: [fn(&mut RegistrationRequest); 8] = [
            |r| r.mac_address = FieldValue::Missing,
            |r| r.model = FieldValue::Missing,
            |r| r.firmware_version = FieldValue::Null,
            |r| r.serial_number = FieldValue::Missing,
            |r| r.mac_address = FieldValue::from(""),
            |r| r.model = FieldValue::from("   "),
            |r| r.firmware_version = FieldValue::from("\n"),
            |r| r.serial_number = FieldValue::from(""),
        ];

        for mutate in cases {
            let mut request = valid_request();
            mutate(&mut request);

            // No expectations: any repository call panics.
            let err = service(MockDeviceRepository::new())
                .register_device(request)
                .await
                .unwrap_err();
            assert!(matches!(err, RegistrationError::InvalidInput(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_malformed_mac_never_touches_repository() {
        for mac in ["AA:BB:CC:DD:EE", "AA:BB:CC:DD:EE:GG", "AABBCCDDEEFF", "AA-BB-CC-DD-EE-FF"] {
            let request = RegistrationRequest::new(mac, "X1", "1.0", "SN123");
            let err = service(MockDeviceRepository::new())
                .register_device(request)
                .await
                .unwrap_err();
            assert!(matches!(err, RegistrationError::InvalidMacAddress(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_required_check_runs_before_mac_check() {
        let request = RegistrationRequest::new("not-a-mac", "", "1.0", "SN123");
        let err = service(MockDeviceRepository::new())
            .register_device(request)
            .await
            .unwrap_err();
        insta::assert_snapshot!(err, @"required field 'model' must not be blank");
    }

    #[tokio::test]
    async fn test_duplicate_mac_is_conflict_and_not_saved() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address()
            .times(1)
            .returning(|_| Ok(Some(existing_device())));
        repo.expect_save().never();

        let request = RegistrationRequest::new("aa:bb:cc:dd:ee:ff", "Other", "9.9", "SN999");
        let err = service(repo).register_device(request).await.unwrap_err();

        insta::assert_snapshot!(err, @"a device with MAC address AA:BB:CC:DD:EE:FF is already registered");
    }

    #[tokio::test]
    async fn test_duplicate_check_runs_before_type_check() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address()
            .returning(|_| Ok(Some(existing_device())));
        repo.expect_save().never();

        let request = valid_request().with_location(FieldValue::Other(json!(5)));
        let err = service(repo).register_device(request).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateMacAddress(_)));
    }

    #[tokio::test]
    async fn test_wrong_type_is_rejected_before_save() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_save().never();

        let request = valid_request().with_display_name(FieldValue::Other(json!(["a", "b"])));
        let err = service(repo).register_device(request).await.unwrap_err();
        insta::assert_snapshot!(err, @"field 'displayName' must be a string, got array");
    }

    #[tokio::test]
    async fn test_uniqueness_violation_at_save_is_conflict() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address().returning(|_| Ok(None));
        repo.expect_save()
            .times(1)
            .returning(|device| Err(RepositoryError::DuplicateMacAddress(device.mac_address)));

        let err = service(repo).register_device(valid_request()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateMacAddress(_)));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_a_rejection() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_mac_address()
            .returning(|_| Err(RepositoryError::Poisoned));
        repo.expect_save().never();

        let err = service(repo).register_device(valid_request()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Repository(RepositoryError::Poisoned)));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_factory_receives_generated_id_and_validated_fields() {
        let mut factory = MockDeviceFactory::new();
        factory
            .expect_create_device()
            .withf(|_, registration| {
                registration.mac_address.as_str() == "AA:BB:CC:DD:EE:FF"
                    && registration.model == "X1"
                    && registration.location.as_deref() == Some("room1")
            })
            .times(1)
            .returning(|device_id, registration| {
                DefaultDeviceFactory.create_device(device_id, registration)
            });

        let repo = Arc::new(InMemoryDeviceRepository::new());
        let service = DeviceRegistrationService::new(repo.clone(), Arc::new(factory));

        let receipt = service.register_device(valid_request()).await.unwrap();
        assert_eq!(repo.devices()[0].device_id, receipt.device_id);
    }

    #[tokio::test]
    async fn test_end_to_end_persists_exactly_one_device() {
        let repo = Arc::new(InMemoryDeviceRepository::new());
        let service = DeviceRegistrationService::with_default_factory(repo.clone());

        let receipt = service.register_device(valid_request()).await.unwrap();

        let devices = repo.devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(
            devices[0],
            Device {
                device_id: receipt.device_id,
                mac_address: MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(),
                model: "X1".to_string(),
                firmware_version: "1.0".to_string(),
                serial_number: "SN123".to_string(),
                display_name: None,
                location: Some("room1".to_string()),
                timezone: Some("UTC".to_string()),
            }
        );

        let again = service.register_device(valid_request()).await.unwrap_err();
        assert!(matches!(again, RegistrationError::DuplicateMacAddress(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_saved_fields_match_what_was_submitted() {
        let repo = Arc::new(InMemoryDeviceRepository::new());
        let service = DeviceRegistrationService::with_default_factory(repo.clone());

        let request = RegistrationRequest::new("AA:BB:CC:DD:EE:FF", " X1 ", "1.0 ", "SN123")
            .with_display_name("");
        service.register_device(request).await.unwrap();

        let device = repo.devices().remove(0);
        assert_eq!(device.model, " X1 ");
        assert_eq!(device.firmware_version, "1.0 ");
        assert_eq!(device.display_name.as_deref(), Some(""));
        assert_eq!(device.location, None);
    }

    #[tokio::test]
    async fn test_repeated_invalid_request_is_stable_and_writes_nothing() {
        let repo = Arc::new(InMemoryDeviceRepository::new());
        let service = DeviceRegistrationService::with_default_factory(repo.clone());

        let mut messages = Vec::new();
        for _ in 0..5 {
            let request = RegistrationRequest::new("AA:BB:CC:DD:EE", "X1", "1.0", "SN123");
            let err = service.register_device(request).await.unwrap_err();
            assert!(matches!(err, RegistrationError::InvalidMacAddress(_)));
            messages.push(err.to_string());
        }

        messages.dedup();
        assert_eq!(messages.len(), 1);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_of_one_mac_yield_one_device() {
        let repo = Arc::new(InMemoryDeviceRepository::new());
        let service = Arc::new(DeviceRegistrationService::with_default_factory(repo.clone()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let request = RegistrationRequest::new(
                        "AA:BB:CC:DD:EE:FF",
                        "X1",
                        "1.0",
                        format!("SN{}", i),
                    );
                    service.register_device(request).await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(RegistrationError::DuplicateMacAddress(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }
}
