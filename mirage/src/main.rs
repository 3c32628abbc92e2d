//! ONVIF Profile T camera emulator
//!
//! Presents one virtual PTZ camera to VMS systems: SOAP services for
//! device, media, PTZ, imaging and events, a motion simulator behind the
//! PTZ service, a synthetic motion-alarm generator behind the pull
//! point, and an optional UDP link to an external actuator that takes
//! over position updates.

use anyhow::Result;
use camera_state::ptz::spawn_feedback;
use camera_state::{events, CameraState, DeviceDocument, DeviceIdentity, PtzEngine};
use clap::Parser;
use onvif_server::{ServerConfig, ServiceState};
use ptz_link::{FeedbackReceiver, LinkSender, DEFAULT_FEEDBACK_PORT};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use ws_security::{Credentials, Verifier};

#[derive(Parser)]
#[command(name = "mirage")]
#[command(about = "ONVIF Profile T camera emulator")]
struct Cli {
    /// IP address to advertise in service URLs (auto-detected when omitted)
    #[arg(long)]
    ip: Option<String>,

    /// Port for the SOAP services
    #[arg(long, default_value_t = 8080)]
    soap_port: u16,

    /// External RTSP URL handed out by GetStreamUri; empty means no stream
    #[arg(long, default_value = "")]
    rtsp_url: String,

    /// Path to the device description JSON
    #[arg(long, default_value = "device_info.json")]
    device_info: PathBuf,

    /// Forward PTZ commands to an external actuator over UDP
    #[arg(long)]
    enable_ptz_forwarding: bool,

    /// Where forwarded PTZ commands go (ip:port)
    #[arg(long, default_value = "127.0.0.1:50001")]
    ptz_forwarding_address: String,

    /// Port position feedback from the actuator arrives on
    #[arg(long, default_value_t = DEFAULT_FEEDBACK_PORT)]
    ptz_feedback_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // A missing or broken device description degrades to defaults with
    // authentication off, it never stops the emulator.
    let document = match DeviceDocument::load_from(&cli.device_info) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(
                "device description unavailable ({}); using defaults, authentication disabled",
                e
            );
            DeviceDocument::default()
        }
    };
    let credentials = document
        .account()
        .map(|(username, password)| Credentials { username, password });
    let identity = DeviceIdentity::from_document(&document, Uuid::new_v4());

    let ip = match cli.ip {
        Some(ip) => ip,
        None => onvif_server::local_ip().unwrap_or_else(|| "127.0.0.1".to_string()),
    };

    let cancel = CancellationToken::new();
    let mut actors = Vec::new();

    let ptz = if cli.enable_ptz_forwarding {
        let target: SocketAddr = cli.ptz_forwarding_address.parse()?;
        let sender = LinkSender::bind(target).await?;
        tracing::info!("forwarding PTZ commands to {}", target);
        PtzEngine::with_link(sender)
    } else {
        PtzEngine::new()
    };

    let camera = Arc::new(CameraState::new(identity, ptz));

    if cli.enable_ptz_forwarding {
        let feedback_addr: SocketAddr = format!("0.0.0.0:{}", cli.ptz_feedback_port).parse()?;
        let receiver = FeedbackReceiver::bind(feedback_addr).await?;
        tracing::info!("listening for PTZ feedback on port {}", cli.ptz_feedback_port);
        actors.push(spawn_feedback(camera.ptz.clone(), receiver, cancel.clone()));
    }

    actors.push(events::spawn_generator(
        camera.events.clone(),
        events::GENERATOR_PERIOD,
        cancel.clone(),
    ));

    let auth_enabled = credentials.is_some();
    let state = Arc::new(ServiceState {
        camera,
        verifier: Verifier::new(credentials),
        config: ServerConfig {
            ip: ip.clone(),
            port: cli.soap_port,
            rtsp_url: cli.rtsp_url.clone(),
        },
    });

    println!("==========================================");
    println!("ONVIF PROFILE T CAMERA EMULATOR");
    println!("==========================================");
    println!();
    println!(
        "Device service: http://{}:{}/onvif/device_service",
        ip, cli.soap_port
    );
    if cli.rtsp_url.is_empty() {
        println!("Stream URI:     (none configured)");
    } else {
        println!("Stream URI:     {}", cli.rtsp_url);
    }
    println!(
        "Authentication: {}",
        if auth_enabled { "enabled" } else { "disabled" }
    );
    println!();

    let addr: SocketAddr = format!("0.0.0.0:{}", cli.soap_port).parse()?;
    let server = tokio::spawn(onvif_server::run(addr, state, cancel.clone()));

    tokio::signal::ctrl_c().await?;
    println!();
    tracing::info!("shutdown requested");
    cancel.cancel();

    for actor in actors {
        let _ = actor.await;
    }
    match server.await {
        Ok(result) => result?,
        Err(e) => tracing::error!("server task failed: {}", e),
    }

    tracing::info!("emulator stopped");
    Ok(())
}
