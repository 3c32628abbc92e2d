//! WS-Security error types

use thiserror::Error;

/// Reasons a request is denied.
///
/// Each variant maps to the SOAP fault subcode ONVIF clients key their
/// retry behavior on, via [`AuthError::subcode`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Security header absent, unreadable, or missing token fields
    #[error("missing or unreadable Security header")]
    MissingCredentials,

    /// Username does not match the configured account
    #[error("unknown username")]
    UnknownUser,

    /// Nonce is not valid base64
    #[error("malformed nonce encoding")]
    MalformedNonce,

    /// Password digest does not match
    #[error("password digest mismatch")]
    DigestMismatch,
}

impl AuthError {
    /// SOAP fault subcode QName for this rejection.
    pub fn subcode(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "wsse:InvalidSecurity",
            AuthError::UnknownUser => "Sender",
            AuthError::MalformedNonce => "Sender",
            AuthError::DigestMismatch => "wsse:FailedAuthentication",
        }
    }
}
