use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::registration::DeviceRegistrationService;
use crate::registration::RegistrationError;
use crate::registration::RegistrationRequest;

/// Paths that accept a device registration. All are POST and share one
/// handler.
pub const REGISTRATION_ROUTES: &[&str] = &["/api/v1/devices", "/registerDevice"];

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
    devices: usize,
}

#[derive(Serialize)]
struct RegisteredResponse {
    message: String,
    device: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: u16,
    message: String,
}

/// An error rendered as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RegistrationError> for ApiError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::InvalidInput(_) | RegistrationError::InvalidMacAddress(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            RegistrationError::DuplicateMacAddress(_) => {
                ApiError::new(StatusCode::CONFLICT, error.to_string())
            }
            RegistrationError::Repository(ref e) => {
                tracing::error!(error = %e, "Device storage failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "device could not be stored",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid JSON body: {}", rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.status.as_u16(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Shared application state
pub struct AppState {
    service: Arc<DeviceRegistrationService>,
    version: &'static str,
}

impl AppState {
    pub fn new(service: Arc<DeviceRegistrationService>) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let devices = state
        .service
        .repository()
        .count()
        .await
        .map_err(RegistrationError::from)?;

    Ok((
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
            devices,
        }),
    ))
}

/// Handler for every path in [`REGISTRATION_ROUTES`]
#[tracing::instrument(skip_all)]
async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let request = RegistrationRequest::from_json(body)?;
    let receipt = state.service.register_device(request).await?;

    Ok((
        StatusCode::OK,
        Json(RegisteredResponse {
            message: receipt.message,
            device: receipt.device_id.to_string(),
        }),
    ))
}

/// Create the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = REGISTRATION_ROUTES
        .iter()
        .fold(Router::new(), |router, path| router.route(path, post(register)));

    router
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Binds to `addr` and serves until `shutdown_rx` fires or its sender is
/// dropped, then drains in-flight requests.
pub async fn serve(
    addr: SocketAddr,
    service: Arc<DeviceRegistrationService>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let app = create_router(Arc::new(AppState::new(service)));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Starting HTTP API server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await
}
