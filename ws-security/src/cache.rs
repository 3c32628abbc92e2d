//! Authorized caller cache
//!
//! A client that presents one valid UsernameToken is remembered by source
//! address and skips digest verification for the rest of its window. VMS
//! software authenticates once and then issues a burst of unsigned
//! follow-up calls; real cameras tolerate this, so the emulator must too.
//!
//! Entries are refreshed on every successful verification and never
//! swept: an expired entry simply stops matching until the caller
//! re-verifies and overwrites it.

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// How long a verified caller stays authorized.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
pub struct AuthorizedClients {
    entries: DashMap<IpAddr, Instant>,
    ttl: Duration,
}

impl AuthorizedClients {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Cache with a custom expiry window.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Whether the caller verified successfully within the window.
    pub fn contains(&self, caller: IpAddr) -> bool {
        self.entries
            .get(&caller)
            .map(|granted| granted.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    /// Record a successful verification, restarting the caller's window.
    pub fn grant(&self, caller: IpAddr) {
        self.entries.insert(caller, Instant::now());
    }

    /// Number of recorded callers, expired entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuthorizedClients {
    fn default() -> Self {
        Self::new()
    }
}
