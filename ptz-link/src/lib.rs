//! PTZ command link
//!
//! JSON-over-UDP side channel for rigs where pan/tilt/zoom is executed
//! by an external actuator: commanded moves go out as single datagrams,
//! and an optional feedback socket reports the position the actuator
//! actually reached.
//!
//! Delivery is fire-and-forget. A lost datagram leaves the reported
//! position stale until the next one arrives, which is acceptable for a
//! channel that repeats itself while the operator holds the joystick.

use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;

/// Default port the actuator listens for commands on.
pub const DEFAULT_COMMAND_PORT: u16 = 50001;

/// Default port position feedback arrives on.
pub const DEFAULT_FEEDBACK_PORT: u16 = 50002;

/// Largest datagram either side will send.
const MAX_DATAGRAM: usize = 1024;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed datagram: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One PTZ message, in either direction. Fields a message does not carry
/// are omitted on the wire and come back as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PtzDatagram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f32>,
}

impl PtzDatagram {
    pub fn encode(&self) -> Result<Vec<u8>, LinkError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LinkError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Sends commanded moves to the actuator.
pub struct LinkSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl LinkSender {
    /// Bind an ephemeral local socket aimed at the actuator address.
    pub async fn bind(target: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send one datagram, best effort. Failures are logged and swallowed;
    /// a PTZ request must not fail because the actuator is down.
    pub async fn publish(&self, datagram: &PtzDatagram) {
        let payload = match datagram.encode() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("failed to encode PTZ datagram: {}", e);
                return;
            }
        };

        if let Err(e) = self.socket.send_to(&payload, self.target).await {
            tracing::warn!("failed to send PTZ command to {}: {}", self.target, e);
        }
    }
}

/// Receives position reports from the actuator.
pub struct FeedbackReceiver {
    socket: UdpSocket,
}

impl FeedbackReceiver {
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next report. A datagram that fails to decode is an
    /// error for the caller to log, never a reason to stop receiving.
    pub async fn recv(&self) -> Result<PtzDatagram, LinkError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, _) = self.socket.recv_from(&mut buf).await?;
        PtzDatagram::decode(&buf[..len])
    }
}
