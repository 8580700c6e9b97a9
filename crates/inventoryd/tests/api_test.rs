use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use inventoryd::api::create_router;
use inventoryd::api::AppState;
use inventoryd::device::Device;
use inventoryd::device::DeviceRepository;
use inventoryd::device::MacAddress;
use inventoryd::device::RepositoryError;
use inventoryd::storage::InMemoryDeviceRepository;
use inventoryd::DeviceRegistrationService;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

fn app(repository: Arc<dyn DeviceRepository>) -> Router {
    let service = Arc::new(DeviceRegistrationService::with_default_factory(repository));
    create_router(Arc::new(AppState::new(service)))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body)
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

fn registration() -> Value {
    json!({
        "macAddress": "AA:BB:CC:DD:EE:FF",
        "model": "X1",
        "firmwareVersion": "1.0",
        "serialNumber": "SN123",
        "displayName": null,
        "location": "room1",
        "timezone": "UTC"
    })
}

#[tokio::test]
async fn test_register_device() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let (status, body) = post(app(repository.clone()), "/api/v1/devices", registration()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Device registered");

    let devices = repository.devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(body["device"], devices[0].device_id.to_string());
    assert_eq!(devices[0].location.as_deref(), Some("room1"));
    assert_eq!(devices[0].display_name, None);
}

#[tokio::test]
async fn test_legacy_route_shares_the_handler() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let (status, _) = post(app(repository.clone()), "/registerDevice", registration()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn test_duplicate_is_a_conflict() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let router = app(repository.clone());

    let (status, _) = post(router.clone(), "/api/v1/devices", registration()).await;
    assert_eq!(status, StatusCode::OK);

    let mut again = registration();
    again["macAddress"] = json!("aa:bb:cc:dd:ee:ff");
    again["serialNumber"] = json!("SN999");
    let (status, body) = post(router, "/registerDevice", again).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "error": {
                "code": 409,
                "message": "a device with MAC address AA:BB:CC:DD:EE:FF is already registered"
            }
        })
    );
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn test_missing_field_is_a_bad_request() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let mut body = registration();
    body.as_object_mut().unwrap().remove("model");

    let (status, body) = post(app(repository.clone()), "/api/v1/devices", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert_eq!(body["error"]["message"], "missing required field 'model'");
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_malformed_mac_is_a_bad_request() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let mut body = registration();
    body["macAddress"] = json!("AA:BB:CC:DD:EE");

    let (status, body) = post(app(repository.clone()), "/api/v1/devices", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("invalid MAC address 'AA:BB:CC:DD:EE'"));
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_wrong_type_is_a_bad_request() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let mut body = registration();
    body["timezone"] = json!(2);

    let (status, body) = post(app(repository.clone()), "/api/v1/devices", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "field 'timezone' must be a string, got number");
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_unparseable_body_is_a_bad_request() {
    let router = app(Arc::new(InMemoryDeviceRepository::new()));

    let (status, body) = send(
        router.clone(),
        Method::POST,
        "/api/v1/devices",
        Some("{\"macAddress\":".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, body) = post(router, "/api/v1/devices", json!(["AA:BB:CC:DD:EE:FF"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "request body must be a JSON object, got array"
    );
}

struct BrokenRepository;

#[async_trait]
impl DeviceRepository for BrokenRepository {
    async fn find_by_mac_address(
        &self,
        _mac_address: &MacAddress,
    ) -> Result<Option<Device>, RepositoryError> {
        Ok(None)
    }

    async fn save(&self, _device: Device) -> Result<(), RepositoryError> {
        Err(RepositoryError::Io {
            path: "/var/lib/inventoryd/devices.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_storage_failure_is_an_internal_error() {
    let (status, body) = post(app(Arc::new(BrokenRepository)), "/api/v1/devices", registration()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": {"code": 500, "message": "device could not be stored"}})
    );
}

#[tokio::test]
async fn test_ping() {
    let router = app(Arc::new(InMemoryDeviceRepository::new()));
    let (status, body) = send(router, Method::GET, "/v1/ping", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_info_counts_devices() {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    let router = app(repository);

    let (status, _) = post(router.clone(), "/api/v1/devices", registration()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(router, Method::GET, "/v1/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["devices"], 1);
    assert!(body["hostname"].is_string());
}
