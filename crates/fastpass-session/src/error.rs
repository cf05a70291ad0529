//! Error types for the session layer.

use fastpass_transport::ConnectionId;

use crate::VerificationOutcome;

/// Errors that can occur while tracking logins or talking to an auth hook.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another verification already settled this session.
    ///
    /// Losing this race is normal when several checks run for one
    /// connection; the caller should drop its result.
    #[error("session for {connection} already resolved as {current:?}")]
    AlreadyResolved {
        connection: ConnectionId,
        current: VerificationOutcome,
    },

    /// `Unresolved` is a starting state, not a result.
    #[error("cannot resolve a session to Unresolved")]
    UnresolvedOutcome,

    /// An auth-plugin adapter could not be constructed.
    #[error("failed to load auth hook for {plugin}: {reason}")]
    HookLoad { plugin: String, reason: String },

    /// The auth plugin reported a failure while handling a player.
    #[error("auth hook failed: {0}")]
    Hook(String),
}
