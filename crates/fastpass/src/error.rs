//! Unified error type for FastPass.

use fastpass_bridge::BridgeError;
use fastpass_protocol::ProtocolError;
use fastpass_session::SessionError;
use fastpass_transport::TransportError;

use crate::LifecycleState;

/// Top-level error that wraps all crate-specific errors.
///
/// Embedders deal with this single type instead of importing errors from
/// each sub-crate. The `#[from]` attribute on each wrapping variant
/// generates the `From` impls, so `?` converts sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum FastPassError {
    /// A backend send failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A plugin message could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session bookkeeping or an auth hook failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A bridge integration was unusable.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// `enable()` gave up before registering anything.
    #[error("startup aborted: {0}")]
    StartupAborted(String),

    /// A lifecycle call was made in the wrong state.
    #[error("operation not allowed while {0}")]
    InvalidState(LifecycleState),

    /// Neither an executor was supplied nor a Tokio runtime found.
    #[error("no executor configured and no Tokio runtime running")]
    NoExecutor,

    /// The player store rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// The standard premium check could not complete.
    #[error("premium verification failed: {0}")]
    Verification(String),
}
