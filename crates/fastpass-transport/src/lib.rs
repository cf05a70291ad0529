//! Host connection abstractions for FastPass.
//!
//! FastPass never owns sockets. The proxy it runs inside accepts players,
//! routes them to backend servers and forwards plugin messages. This crate
//! describes the slice of that host which the login layer touches:
//!
//! - [`PendingConnection`]: a player that is still logging in
//! - [`BackendServer`]: a backend the player has been routed to
//! - [`Router`]: answers "where is this player right now?"
//!
//! All three are traits so the host (and tests) can plug in their own types.

mod error;

pub use error::TransportError;

use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A player connection that has not finished logging in yet.
///
/// The host hands these out as `Arc<C>`. FastPass only ever keeps a
/// `Weak` to them, so dropping the host's last `Arc` is what ends the
/// connection's life as far as the login layer is concerned.
pub trait PendingConnection: Send + Sync + 'static {
    /// Stable identifier, unique for the lifetime of the process.
    fn id(&self) -> ConnectionId;

    /// The username the client announced in its login start.
    fn username(&self) -> &str;

    /// Asks the host to run the encrypted (online-mode) handshake for
    /// this connection.
    fn set_online_mode(&self, online: bool);

    /// Whether online mode is currently requested for this connection.
    fn is_online_mode(&self) -> bool;
}

/// A backend server a player has been forwarded to.
pub trait BackendServer: Send + Sync + 'static {
    /// The name the proxy knows this backend by.
    fn name(&self) -> &str;

    /// Queues a plugin message on `channel`.
    ///
    /// Must not block on network I/O: the host copies the bytes into its
    /// own outbound buffer and returns.
    fn send_data(&self, channel: &str, data: &[u8]) -> Result<(), TransportError>;
}

/// Resolves the backend a connection is currently routed to.
pub trait Router: Send + Sync + 'static {
    /// Returns `None` while the player is not connected to any backend.
    fn current_backend_of(
        &self,
        connection: ConnectionId,
    ) -> Option<Arc<dyn BackendServer>>;
}
