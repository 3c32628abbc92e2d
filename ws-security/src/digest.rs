//! WS-Security password digest computation
//!
//! Implements the OASIS WS-Security UsernameToken Profile 1.1 password digest:
//! `digest = base64(sha1(nonce + created + password))`
//! where the nonce is decoded from its base64 wire form first.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// Compute the expected password digest for a token's nonce and created
/// timestamp.
///
/// Fails only when the nonce is not valid base64; the created value is
/// hashed as-is, so its format never matters here.
pub fn password_digest(
    nonce_b64: &str,
    created: &str,
    password: &str,
) -> Result<String, AuthError> {
    let nonce = STANDARD
        .decode(nonce_b64)
        .map_err(|_| AuthError::MalformedNonce)?;

    let mut hasher = Sha1::new();
    hasher.update(&nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());

    Ok(STANDARD.encode(hasher.finalize()))
}

/// Constant-time comparison of a presented digest against the expected one.
pub fn digests_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
