//! Imaging settings
//!
//! Brightness, contrast and saturation, each defaulting to mid-scale.
//! Updates apply only the fields a request carries; the rest keep their
//! current values.

use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ImagingSettings {
    fn default() -> Self {
        Self {
            brightness: 50.0,
            contrast: 50.0,
            saturation: 50.0,
        }
    }
}

/// Imaging state behind its own lock, so imaging calls never contend
/// with PTZ or event traffic.
#[derive(Debug, Default)]
pub struct ImagingState {
    settings: Mutex<ImagingSettings>,
}

impl ImagingState {
    pub async fn snapshot(&self) -> ImagingSettings {
        *self.settings.lock().await
    }

    /// Apply the provided fields, keeping current values for the rest.
    pub async fn apply(
        &self,
        brightness: Option<f32>,
        contrast: Option<f32>,
        saturation: Option<f32>,
    ) {
        let mut settings = self.settings.lock().await;
        if let Some(v) = brightness {
            settings.brightness = v;
        }
        if let Some(v) = contrast {
            settings.contrast = v;
        }
        if let Some(v) = saturation {
            settings.saturation = v;
        }
    }
}
