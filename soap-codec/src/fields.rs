//! Request field extraction
//!
//! Pulls optional parameters out of PTZ and imaging request bodies. Every
//! field is independently optional: a missing element, a bad attribute or
//! an unparsable number leaves that field `None` and never fails the
//! request.

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Pan/tilt/zoom components of a PTZ move request. Axes the request does
/// not mention stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveVector {
    pub pan: Option<f32>,
    pub tilt: Option<f32>,
    pub zoom: Option<f32>,
}

impl MoveVector {
    pub fn is_empty(&self) -> bool {
        self.pan.is_none() && self.tilt.is_none() && self.zoom.is_none()
    }
}

/// Imaging parameters of a `SetImagingSettings` request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImagingFields {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
}

/// Extract the PTZ vector nested under the named container element:
/// `"Position"` for AbsoluteMove, `"Velocity"` for ContinuousMove.
///
/// Reads `PanTilt` `x`/`y` and `Zoom` `x` attributes, but only while
/// inside the container, so a velocity request never supplies a position
/// and vice versa.
pub fn extract_move_vector(xml: &str, container: &str) -> MoveVector {
    let mut reader = Reader::from_str(xml);
    let mut vector = MoveVector::default();
    let mut in_container = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local_name = e.local_name();
                let name = String::from_utf8_lossy(local_name.as_ref());

                if name == container {
                    in_container = true;
                } else if in_container && name == "PanTilt" {
                    vector.pan = float_attr(&e, "x");
                    vector.tilt = float_attr(&e, "y");
                } else if in_container && name == "Zoom" {
                    vector.zoom = float_attr(&e, "x");
                }
            }
            Ok(Event::End(e)) => {
                let local_name = e.local_name();
                if String::from_utf8_lossy(local_name.as_ref()) == container {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    vector
}

/// Extract brightness/contrast/saturation from a `SetImagingSettings`
/// request. The values are element text, not attributes.
pub fn extract_imaging_fields(xml: &str) -> ImagingFields {
    let mut reader = Reader::from_str(xml);
    let mut fields = ImagingFields::default();
    let mut current: Option<ImagingAxis> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local_name = e.local_name();
                current = match local_name.as_ref() {
                    b"Brightness" => Some(ImagingAxis::Brightness),
                    b"Contrast" => Some(ImagingAxis::Contrast),
                    b"Saturation" => Some(ImagingAxis::Saturation),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let Some(axis) = current {
                    let value = t
                        .unescape()
                        .ok()
                        .and_then(|v| v.trim().parse::<f32>().ok())
                        .filter(|v| v.is_finite());
                    if let Some(value) = value {
                        match axis {
                            ImagingAxis::Brightness => fields.brightness = Some(value),
                            ImagingAxis::Contrast => fields.contrast = Some(value),
                            ImagingAxis::Saturation => fields.saturation = Some(value),
                        }
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    fields
}

#[derive(Clone, Copy)]
enum ImagingAxis {
    Brightness,
    Contrast,
    Saturation,
}

// Non-finite values are treated as absent; downstream state is clamped
// and must never see NaN.
fn float_attr(e: &BytesStart<'_>, key: &str) -> Option<f32> {
    for attr in e.attributes().flatten() {
        let key_local = attr.key.local_name();
        if key_local.as_ref() == key.as_bytes() {
            return attr
                .unescape_value()
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f32| v.is_finite());
        }
    }
    None
}
