//! ONVIF camera emulator server
//!
//! Presents one virtual Profile T camera to VMS systems: device, media,
//! PTZ, imaging and event services over SOAP/HTTP, plus the pull-point
//! endpoint events are delivered through.
//!
//! Request flow on every endpoint: authorize, resolve the action against
//! the service's dispatch table, run the handler. Authorization failures
//! become SOAP faults; unknown actions become plain 501s, which is what
//! the emulated firmware does.

pub mod dispatch;
mod templates;

use axum::{
    extract::{connect_info::ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use camera_state::CameraState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use ws_security::Verifier;

pub use dispatch::{dispatch, resolve, Action, Service};

/// Fault reason reported for every authorization failure. Clients key on
/// the subcode; the reason text stays constant.
pub const AUTH_FAULT_REASON: &str = "An error occurred when verifying security";

/// Where the emulator is reachable, for the URLs baked into responses.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    /// RTSP URL handed out by GetStreamUri; empty when no stream exists
    pub rtsp_url: String,
}

impl ServerConfig {
    /// Absolute URL of a service path on this emulator.
    pub fn service_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.ip, self.port, path)
    }
}

/// Shared state behind the router.
pub struct ServiceState {
    pub camera: Arc<CameraState>,
    pub verifier: Verifier,
    pub config: ServerConfig,
}

/// Outcome of one SOAP request.
#[derive(Debug, Clone, PartialEq)]
pub enum SoapReply {
    /// Rendered response envelope
    Envelope(String),
    /// Rendered fault envelope; still HTTP 200, as the emulated firmware
    /// answers faults
    Fault(String),
    /// Action missing or not in the service's table
    NotImplemented,
}

impl IntoResponse for SoapReply {
    fn into_response(self) -> Response {
        match self {
            SoapReply::Envelope(xml) | SoapReply::Fault(xml) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/soap+xml")],
                xml,
            )
                .into_response(),
            SoapReply::NotImplemented => {
                (StatusCode::NOT_IMPLEMENTED, "Not Implemented").into_response()
            }
        }
    }
}

/// Build the SOAP endpoint router.
pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/onvif/device_service", post(device_service))
        .route("/onvif/media_service", post(media_service))
        .route("/onvif/ptz_service", post(ptz_service))
        .route("/onvif/imaging_service", post(imaging_service))
        .route("/onvif/events_service", post(events_service))
        .route("/onvif/events/pullpoint", post(pullpoint_service))
        .with_state(state)
}

/// Serve the SOAP endpoints until the token is cancelled.
pub async fn run(
    addr: SocketAddr,
    state: Arc<ServiceState>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("SOAP services listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await?;

    Ok(())
}

async fn device_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::Device, &body, addr.ip()).await
}

async fn media_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::Media, &body, addr.ip()).await
}

async fn ptz_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::Ptz, &body, addr.ip()).await
}

async fn imaging_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::Imaging, &body, addr.ip()).await
}

async fn events_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::Events, &body, addr.ip()).await
}

async fn pullpoint_service(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServiceState>>,
    body: String,
) -> SoapReply {
    dispatch(&state, Service::PullPoint, &body, addr.ip()).await
}

/// Get the local IP address by connecting to an external address
pub fn local_ip() -> Option<String> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    Some(addr.ip().to_string())
}
