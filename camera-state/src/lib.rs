//! Camera state
//!
//! Everything the emulated camera remembers: the reported identity, the
//! fixed media profile, live PTZ state with its motion loop, imaging
//! settings and the pull-point event queue. One [`CameraState`] is built
//! at startup and shared behind an `Arc`; there is no global state.
//!
//! Components that background tasks need (`ptz`, `events`) are held
//! behind their own `Arc` so the tasks outlive individual requests.

pub mod events;
pub mod identity;
pub mod imaging;
pub mod profile;
pub mod ptz;

pub use events::{EventQueue, EventRecord};
pub use identity::{DeviceDocument, DeviceIdentity, DocumentError};
pub use imaging::{ImagingSettings, ImagingState};
pub use profile::MediaProfile;
pub use ptz::{PtzEngine, PtzPosition, PtzStatus};

use std::sync::Arc;

/// Aggregate state for one emulated camera.
pub struct CameraState {
    pub identity: DeviceIdentity,
    pub profile: MediaProfile,
    pub ptz: Arc<PtzEngine>,
    pub imaging: ImagingState,
    pub events: Arc<EventQueue>,
}

impl CameraState {
    pub fn new(identity: DeviceIdentity, ptz: PtzEngine) -> Self {
        Self {
            identity,
            profile: MediaProfile::profile_t(),
            ptz: Arc::new(ptz),
            imaging: ImagingState::default(),
            events: Arc::new(EventQueue::new()),
        }
    }
}
