//! Media profile
//!
//! The emulator exposes a single fixed Profile T media profile: one H.265
//! encoder at 1080p with the token set VMS discovery walks. Everything
//! here is a compile-time constant; nothing is mutable at runtime.

pub const PROFILE_TOKEN: &str = "Profile_T_1";
pub const PROFILE_NAME: &str = "ProfileT_H265";
pub const VIDEO_SOURCE_TOKEN: &str = "VideoSource_1";
pub const VIDEO_ENCODER_TOKEN: &str = "VideoEncoder_H265_1";
pub const PTZ_NODE_TOKEN: &str = "PTZNode_1";
pub const PTZ_CONFIGURATION_TOKEN: &str = "PTZConfiguration_1";

/// Fixed H.265 encoder settings advertised by the profile.
#[derive(Debug, Clone, Copy)]
pub struct VideoEncoder {
    pub encoding: &'static str,
    pub width: u32,
    pub height: u32,
    pub quality: u32,
    pub framerate_limit: u32,
    pub encoding_interval: u32,
    pub bitrate_limit: u32,
    pub session_timeout: &'static str,
}

/// The single advertised media profile.
#[derive(Debug, Clone, Copy)]
pub struct MediaProfile {
    pub token: &'static str,
    pub name: &'static str,
    pub video_source: &'static str,
    pub video_encoder: &'static str,
    pub ptz_node: &'static str,
    pub ptz_configuration: &'static str,
    pub encoder: VideoEncoder,
}

impl MediaProfile {
    pub const fn profile_t() -> Self {
        Self {
            token: PROFILE_TOKEN,
            name: PROFILE_NAME,
            video_source: VIDEO_SOURCE_TOKEN,
            video_encoder: VIDEO_ENCODER_TOKEN,
            ptz_node: PTZ_NODE_TOKEN,
            ptz_configuration: PTZ_CONFIGURATION_TOKEN,
            encoder: VideoEncoder {
                encoding: "H265",
                width: 1920,
                height: 1080,
                quality: 5,
                framerate_limit: 30,
                encoding_interval: 1,
                bitrate_limit: 4096,
                session_timeout: "PT60S",
            },
        }
    }
}

impl Default for MediaProfile {
    fn default() -> Self {
        Self::profile_t()
    }
}
