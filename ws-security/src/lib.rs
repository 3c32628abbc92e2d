//! WS-Security UsernameToken verification
//!
//! Implements the OASIS WS-Security UsernameToken Profile 1.1 digest check
//! ONVIF clients use, plus the authorized-caller behavior of a real camera:
//! one valid token authorizes the caller's source address for ten minutes,
//! covering the burst of unsigned follow-up calls VMS software sends.
//!
//! # Example
//!
//! ```rust,ignore
//! use ws_security::{AuthDecision, Credentials, Verifier};
//!
//! let verifier = Verifier::new(Some(Credentials {
//!     username: "admin".to_string(),
//!     password: "secret".to_string(),
//! }));
//!
//! match verifier.authorize(action.as_deref(), &body, caller, &["GetCapabilities"]) {
//!     AuthDecision::Allowed(_) => { /* dispatch */ }
//!     AuthDecision::Denied(e) => { /* fault with e.subcode() */ }
//! }
//! ```

pub mod cache;
pub mod digest;
pub mod error;
pub mod parse;

pub use cache::AuthorizedClients;
pub use error::AuthError;
pub use parse::UsernameToken;

use std::net::IpAddr;

/// Credentials a presented token must prove knowledge of.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The action is callable without credentials
    OpenAction,
    /// The caller verified recently and is still inside its window
    CachedCaller,
    /// No credentials configured; verification is disabled
    AuthDisabled,
    /// The request carried a valid UsernameToken
    ValidToken,
}

/// Outcome of [`Verifier::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Allowed(AllowReason),
    Denied(AuthError),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allowed(_))
    }
}

/// Request authorizer: the configured credentials plus the caller cache.
pub struct Verifier {
    credentials: Option<Credentials>,
    clients: AuthorizedClients,
}

impl Verifier {
    /// Verifier with the default ten-minute caller window. `None`
    /// credentials disable verification entirely.
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self::with_clients(credentials, AuthorizedClients::new())
    }

    /// Verifier over a pre-built cache, for custom expiry windows.
    pub fn with_clients(credentials: Option<Credentials>, clients: AuthorizedClients) -> Self {
        Self {
            credentials,
            clients,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Number of callers that have verified at least once, for monitoring.
    pub fn cached_callers(&self) -> usize {
        self.clients.len()
    }

    /// Decide whether a request may proceed.
    ///
    /// Checks run in a fixed order: open actions first, then the caller
    /// cache, then whether verification is enabled at all, and only then
    /// the token itself. A successful token check records the caller
    /// before allowing, so subsequent requests from the same address pass
    /// without a token.
    pub fn authorize(
        &self,
        action: Option<&str>,
        xml: &str,
        caller: IpAddr,
        open_actions: &[&str],
    ) -> AuthDecision {
        if let Some(action) = action {
            if open_actions.contains(&action) {
                return AuthDecision::Allowed(AllowReason::OpenAction);
            }
        }

        if self.clients.contains(caller) {
            return AuthDecision::Allowed(AllowReason::CachedCaller);
        }

        let Some(credentials) = &self.credentials else {
            return AuthDecision::Allowed(AllowReason::AuthDisabled);
        };

        let Some(token) = parse::extract_token(xml) else {
            return AuthDecision::Denied(AuthError::MissingCredentials);
        };

        if token.username != credentials.username {
            return AuthDecision::Denied(AuthError::UnknownUser);
        }

        let expected =
            match digest::password_digest(&token.nonce, &token.created, &credentials.password) {
                Ok(expected) => expected,
                Err(e) => return AuthDecision::Denied(e),
            };

        if !digest::digests_match(&token.digest, &expected) {
            return AuthDecision::Denied(AuthError::DigestMismatch);
        }

        self.clients.grant(caller);
        AuthDecision::Allowed(AllowReason::ValidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;
    use std::time::Duration;

    const CREATED: &str = "2024-01-01T00:00:00Z";
    const NONCE: &str = "YWJj";

    fn caller(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, last))
    }

    fn credentials() -> Option<Credentials> {
        Some(Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
    }

    fn signed_request(username: &str, password: &str, nonce: &str) -> String {
        let digest = digest::password_digest(nonce, CREATED, password)
            .unwrap_or_else(|_| "AAAA".to_string());
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Header>
    <Security>
      <UsernameToken>
        <Username>{}</Username>
        <Password>{}</Password>
        <Nonce>{}</Nonce>
        <Created>{}</Created>
      </UsernameToken>
    </Security>
  </s:Header>
  <s:Body><GetDeviceInformation/></s:Body>
</s:Envelope>"#,
            username, digest, nonce, CREATED
        )
    }

    #[test]
    fn open_action_bypasses_verification() {
        let verifier = Verifier::new(credentials());
        let decision = verifier.authorize(
            Some("GetCapabilities"),
            "<unsigned/>",
            caller(1),
            &["GetCapabilities"],
        );
        assert_eq!(decision, AuthDecision::Allowed(AllowReason::OpenAction));
        assert_eq!(verifier.cached_callers(), 0);
    }

    #[test]
    fn disabled_auth_allows_everything() {
        let verifier = Verifier::new(None);
        let decision = verifier.authorize(Some("GetProfiles"), "<unsigned/>", caller(1), &[]);
        assert_eq!(decision, AuthDecision::Allowed(AllowReason::AuthDisabled));
    }

    #[test]
    fn valid_token_is_allowed_and_cached() {
        let verifier = Verifier::new(credentials());
        let body = signed_request("admin", "secret", NONCE);

        let decision = verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);
        assert_eq!(decision, AuthDecision::Allowed(AllowReason::ValidToken));
        assert_eq!(verifier.cached_callers(), 1);

        // The next request from the same address needs no token at all.
        let decision = verifier.authorize(Some("GetProfiles"), "<unsigned/>", caller(1), &[]);
        assert_eq!(decision, AuthDecision::Allowed(AllowReason::CachedCaller));
    }

    #[test]
    fn cache_is_per_address() {
        let verifier = Verifier::new(credentials());
        let body = signed_request("admin", "secret", NONCE);
        verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);

        let decision = verifier.authorize(Some("GetProfiles"), "<unsigned/>", caller(2), &[]);
        assert_eq!(
            decision,
            AuthDecision::Denied(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn cached_caller_expires() {
        let verifier = Verifier::with_clients(
            credentials(),
            AuthorizedClients::with_ttl(Duration::from_millis(40)),
        );
        let body = signed_request("admin", "secret", NONCE);
        verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);

        thread::sleep(Duration::from_millis(60));
        let decision = verifier.authorize(Some("GetProfiles"), "<unsigned/>", caller(1), &[]);
        assert_eq!(
            decision,
            AuthDecision::Denied(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn missing_header_is_invalid_security() {
        let verifier = Verifier::new(credentials());
        let decision = verifier.authorize(Some("GetProfiles"), "<unsigned/>", caller(1), &[]);
        assert_eq!(
            decision,
            AuthDecision::Denied(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn wrong_username_is_sender_fault() {
        let verifier = Verifier::new(credentials());
        let body = signed_request("intruder", "secret", NONCE);
        let decision = verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);
        assert_eq!(decision, AuthDecision::Denied(AuthError::UnknownUser));
    }

    #[test]
    fn malformed_nonce_is_sender_fault() {
        let verifier = Verifier::new(credentials());
        let body = signed_request("admin", "secret", "!!not-base64!!");
        let decision = verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);
        assert_eq!(decision, AuthDecision::Denied(AuthError::MalformedNonce));
    }

    #[test]
    fn wrong_password_is_failed_authentication() {
        let verifier = Verifier::new(credentials());
        let body = signed_request("admin", "wrong", NONCE);
        let decision = verifier.authorize(Some("GetProfiles"), &body, caller(1), &[]);
        assert_eq!(decision, AuthDecision::Denied(AuthError::DigestMismatch));
        // Failed verification must not authorize the caller.
        assert_eq!(verifier.cached_callers(), 0);
    }
}
