//! Session types: the proxy's record of one login in progress.
//!
//! A session exists from the moment a connection says hello until the
//! connection object is dropped by the host. It tracks:
//! - WHO is logging in (connection id and announced username)
//! - HOW they are being verified (handshake or bridge)
//! - WHAT the verification concluded (unresolved, premium, not premium)
//! - WHICH backends have already been told about a successful login

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use fastpass_transport::ConnectionId;
use rand::Rng;
use uuid::Uuid;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session bookkeeping.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum store size before a `put` sweeps out sessions whose
    /// connection has been dropped. The threshold grows to twice the live
    /// population after each sweep, so sweeps stay amortized O(1).
    ///
    /// Default: 64.
    pub purge_threshold: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            purge_threshold: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// VerificationOutcome / VerificationStrategy
// ---------------------------------------------------------------------------

/// Where a session's verification currently stands.
///
/// ```text
///   Unresolved ──→ Premium
///        │
///        └─────→ NotPremium
/// ```
///
/// There is no way back to `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationOutcome {
    Unresolved,
    Premium,
    NotPremium,
}

impl VerificationOutcome {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub fn is_premium(self) -> bool {
        matches!(self, Self::Premium)
    }
}

/// Which verification path applies to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStrategy {
    /// Standard online-mode handshake against the session servers.
    Handshake,
    /// The player came in through a Bedrock bridge, which vouches for them.
    Bridge,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Resolution {
    outcome: VerificationOutcome,
    verified_uuid: Option<Uuid>,
}

/// One connection's login record.
///
/// Shared as `Arc<Session>` between the store and any in-flight
/// verification tasks. The outcome lives in a [`OnceLock`], so concurrent
/// calls to [`resolve`](Self::resolve) linearize: exactly one succeeds and
/// every reader observes that one result, UUID included.
#[derive(Debug)]
pub struct Session {
    connection: ConnectionId,
    username: String,
    strategy: VerificationStrategy,
    created_at: Instant,
    resolution: OnceLock<Resolution>,
    verification_claimed: AtomicBool,
    token: [u8; 16],
    announced_to: Mutex<HashSet<String>>,
}

impl Session {
    /// Creates an unresolved session with a fresh random token.
    pub fn new(
        connection: ConnectionId,
        username: impl Into<String>,
        strategy: VerificationStrategy,
    ) -> Self {
        Self {
            connection,
            username: username.into(),
            strategy,
            created_at: Instant::now(),
            resolution: OnceLock::new(),
            verification_claimed: AtomicBool::new(false),
            token: generate_token(),
            announced_to: Mutex::new(HashSet::new()),
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn strategy(&self) -> VerificationStrategy {
        self.strategy
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn outcome(&self) -> VerificationOutcome {
        self.resolution
            .get()
            .map_or(VerificationOutcome::Unresolved, |r| r.outcome)
    }

    /// UUID produced by a premium verification, if any.
    pub fn verified_uuid(&self) -> Option<Uuid> {
        self.resolution.get().and_then(|r| r.verified_uuid)
    }

    /// 128 random bits identifying this login to backends.
    pub fn token(&self) -> &[u8; 16] {
        &self.token
    }

    /// Settles the verification.
    ///
    /// # Errors
    /// - [`SessionError::UnresolvedOutcome`] if `outcome` is `Unresolved`
    /// - [`SessionError::AlreadyResolved`] if another caller got there first
    pub fn resolve(
        &self,
        outcome: VerificationOutcome,
        verified_uuid: Option<Uuid>,
    ) -> Result<(), SessionError> {
        if !outcome.is_resolved() {
            return Err(SessionError::UnresolvedOutcome);
        }

        // Only premium logins carry an identity.
        let verified_uuid = verified_uuid.filter(|_| outcome.is_premium());

        self.resolution
            .set(Resolution {
                outcome,
                verified_uuid,
            })
            .map_err(|_| SessionError::AlreadyResolved {
                connection: self.connection,
                current: self.outcome(),
            })?;

        tracing::debug!(
            conn_id = %self.connection,
            player = %self.username,
            ?outcome,
            "session resolved"
        );
        Ok(())
    }

    /// Claims the right to run this session's verification.
    ///
    /// Returns `true` for exactly one caller over the session's lifetime.
    pub fn claim_verification(&self) -> bool {
        !self.verification_claimed.swap(true, Ordering::AcqRel)
    }

    /// Records that `backend` has been told about this login.
    ///
    /// Returns `true` only the first time for each backend name.
    pub fn mark_announced(&self, backend: &str) -> bool {
        self.announced_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(backend.to_owned())
    }
}

fn generate_token() -> [u8; 16] {
    rand::rng().random()
}
