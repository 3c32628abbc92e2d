//! Device identity
//!
//! What the emulator reports in GetDeviceInformation, loaded from an
//! operator-provided JSON document. The same document optionally names
//! the SOAP account; wiring those credentials up happens in the binary,
//! so this crate stays authentication-agnostic.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("device document not found: {0}")]
    NotFound(String),

    #[error("failed to read device document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse device document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Operator-provided identity document (`device_info.json`).
///
/// Every key is optional; anything missing falls back to a default at
/// [`DeviceIdentity::from_document`]. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceDocument {
    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(rename = "Model")]
    pub model: Option<String>,
    #[serde(rename = "FirmwareVersion")]
    pub firmware_version: Option<String>,
    #[serde(rename = "HardwareId")]
    pub hardware_id: Option<String>,
    #[serde(rename = "Username")]
    pub username: Option<String>,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}

impl DeviceDocument {
    pub fn load_from(path: &Path) -> Result<Self, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Username/password pair when the document names an account with a
    /// non-empty username. An absent or blank account disables request
    /// verification entirely.
    pub fn account(&self) -> Option<(String, String)> {
        let username = self.username.clone().filter(|u| !u.is_empty())?;
        Some((username, self.password.clone().unwrap_or_default()))
    }
}

/// Identity reported by GetDeviceInformation.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub hardware_id: String,
    /// Fresh per process start, like a camera that never persists one
    pub serial: Uuid,
}

impl DeviceIdentity {
    pub fn from_document(doc: &DeviceDocument, serial: Uuid) -> Self {
        Self {
            manufacturer: doc
                .manufacturer
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            model: doc.model.clone().unwrap_or_else(|| "Unknown".to_string()),
            firmware_version: doc
                .firmware_version
                .clone()
                .unwrap_or_else(|| "0.0.0".to_string()),
            hardware_id: doc
                .hardware_id
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            serial,
        }
    }
}
