//! Action resolution and dispatch
//!
//! Each SOAP endpoint names a service; the service's table decides which
//! actions exist there. Dispatch authorizes the request first, then
//! resolves the action and runs it. An action posted to the wrong
//! endpoint resolves to nothing and gets the same 501 an unknown action
//! does.

use crate::{templates, ServiceState, SoapReply, AUTH_FAULT_REASON};
use soap_codec::{extract_action, extract_imaging_fields, extract_move_vector, Envelope};
use std::net::IpAddr;
use ws_security::AuthDecision;

/// The SOAP services the emulator exposes, one per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Device,
    Media,
    Ptz,
    Imaging,
    Events,
    PullPoint,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Device => "device",
            Service::Media => "media",
            Service::Ptz => "ptz",
            Service::Imaging => "imaging",
            Service::Events => "events",
            Service::PullPoint => "pullpoint",
        }
    }

    /// Actions callable on this service without credentials.
    /// GetCapabilities stays open so discovery works before a client
    /// has authenticated.
    pub fn open_actions(&self) -> &'static [&'static str] {
        match self {
            Service::Device => &["GetCapabilities"],
            _ => &[],
        }
    }
}

/// Every action the emulator implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetCapabilities,
    GetDeviceInformation,
    GetProfiles,
    GetStreamUri,
    GetVideoEncoderConfigurations,
    GetNodes,
    GetConfigurations,
    AbsoluteMove,
    ContinuousMove,
    Stop,
    GetStatus,
    GetImagingSettings,
    SetImagingSettings,
    CreatePullPointSubscription,
    PullMessages,
}

/// Look an action name up in the service's table.
pub fn resolve(service: Service, action: &str) -> Option<Action> {
    match (service, action) {
        (Service::Device, "GetCapabilities") => Some(Action::GetCapabilities),
        (Service::Device, "GetDeviceInformation") => Some(Action::GetDeviceInformation),
        (Service::Media, "GetProfiles") => Some(Action::GetProfiles),
        (Service::Media, "GetStreamUri") => Some(Action::GetStreamUri),
        (Service::Media, "GetVideoEncoderConfigurations") => {
            Some(Action::GetVideoEncoderConfigurations)
        }
        (Service::Ptz, "GetNodes") => Some(Action::GetNodes),
        (Service::Ptz, "GetConfigurations") => Some(Action::GetConfigurations),
        (Service::Ptz, "AbsoluteMove") => Some(Action::AbsoluteMove),
        (Service::Ptz, "ContinuousMove") => Some(Action::ContinuousMove),
        (Service::Ptz, "Stop") => Some(Action::Stop),
        (Service::Ptz, "GetStatus") => Some(Action::GetStatus),
        (Service::Imaging, "GetImagingSettings") => Some(Action::GetImagingSettings),
        (Service::Imaging, "SetImagingSettings") => Some(Action::SetImagingSettings),
        (Service::Events, "CreatePullPointSubscription") => {
            Some(Action::CreatePullPointSubscription)
        }
        (Service::PullPoint, "PullMessages") => Some(Action::PullMessages),
        _ => None,
    }
}

/// Authorize, resolve and run one request against a service.
pub async fn dispatch(
    state: &ServiceState,
    service: Service,
    body: &str,
    caller: IpAddr,
) -> SoapReply {
    let action = extract_action(body);

    let decision =
        state
            .verifier
            .authorize(action.as_deref(), body, caller, service.open_actions());
    if let AuthDecision::Denied(err) = decision {
        tracing::warn!("{} service denied {}: {}", service.name(), caller, err);
        return SoapReply::Fault(Envelope::fault(err.subcode(), AUTH_FAULT_REASON).render());
    }

    let Some(name) = action else {
        tracing::warn!("{} service request carried no action", service.name());
        return SoapReply::NotImplemented;
    };
    let Some(action) = resolve(service, &name) else {
        tracing::warn!("unhandled {} service action: {}", service.name(), name);
        return SoapReply::NotImplemented;
    };

    tracing::info!("{} service received action: {}", service.name(), name);
    handle(state, action, body).await
}

async fn handle(state: &ServiceState, action: Action, request: &str) -> SoapReply {
    let camera = &state.camera;
    let body = match action {
        Action::GetCapabilities => templates::capabilities(&state.config),
        Action::GetDeviceInformation => templates::device_information(&camera.identity),
        Action::GetProfiles => templates::profiles(&camera.profile),
        Action::GetStreamUri => templates::stream_uri(&state.config.rtsp_url),
        Action::GetVideoEncoderConfigurations => {
            templates::video_encoder_configurations(&camera.profile)
        }
        Action::GetNodes => templates::ptz_nodes(&camera.profile),
        Action::GetConfigurations => templates::ptz_configurations(&camera.profile),
        Action::AbsoluteMove => {
            let target = extract_move_vector(request, "Position");
            camera
                .ptz
                .absolute_move(target.pan, target.tilt, target.zoom)
                .await;
            templates::ABSOLUTE_MOVE_ACK.to_string()
        }
        Action::ContinuousMove => {
            let velocity = extract_move_vector(request, "Velocity");
            camera
                .ptz
                .continuous_move(velocity.pan, velocity.tilt, velocity.zoom)
                .await;
            templates::CONTINUOUS_MOVE_ACK.to_string()
        }
        Action::Stop => {
            camera.ptz.stop().await;
            templates::STOP_ACK.to_string()
        }
        Action::GetStatus => templates::ptz_status(&camera.ptz.status().await),
        Action::GetImagingSettings => templates::imaging_settings(&camera.imaging.snapshot().await),
        Action::SetImagingSettings => {
            let fields = extract_imaging_fields(request);
            camera
                .imaging
                .apply(fields.brightness, fields.contrast, fields.saturation)
                .await;
            templates::SET_IMAGING_ACK.to_string()
        }
        Action::CreatePullPointSubscription => templates::pullpoint_subscription(&state.config),
        Action::PullMessages => templates::pull_messages(&camera.events.drain().await),
    };
    SoapReply::Envelope(Envelope::success(body).render())
}
