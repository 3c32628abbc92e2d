//! SOAP 1.2 Codec
//!
//! Request parsing and response rendering for the ONVIF services.
//!
//! Requests are read with streaming `quick-xml` passes that never build a
//! DOM and never fail the request: a malformed document simply yields no
//! action or no fields. Responses are body fragments wrapped by
//! [`Envelope`], so the outer document, its namespace declarations and
//! fault structure are written in exactly one place.

pub mod action;
pub mod envelope;
pub mod fields;

pub use action::extract_action;
pub use envelope::{xml_escape, Envelope};
pub use fields::{extract_imaging_fields, extract_move_vector, ImagingFields, MoveVector};
