//! The unified bridge capability.
//!
//! Bedrock clients cannot run the Java login handshake. A bridge plugin
//! translates their protocol and, in doing so, already knows who they are.
//! [`BridgeService`] is the one question-and-answer surface the rest of
//! FastPass uses, regardless of which bridge is installed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which bridge implementation backs a [`BridgeService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeKind {
    Floodgate,
    Geyser,
}

impl fmt::Display for BridgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floodgate => f.write_str("Floodgate"),
            Self::Geyser => f.write_str("Geyser"),
        }
    }
}

/// A Java account a Bedrock player has linked to their Xbox identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub java_uuid: Uuid,
    pub java_username: String,
}

/// What a bridge knows about one connected Bedrock player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedrockPlayer {
    /// Username as seen by the proxy (may carry a bridge prefix).
    pub username: String,
    /// Xbox user id.
    pub xuid: String,
    /// UUID the bridge assigned on the Java side.
    pub java_uuid: Uuid,
    pub linked: Option<LinkedAccount>,
}

/// Read-only view of the players a bridge plugin currently tunnels.
///
/// Provided by the host; it wraps the bridge plugin's own API.
pub trait BedrockDirectory: Send + Sync + 'static {
    /// Looks up a connected Bedrock player by proxy-side username.
    fn find_player(&self, username: &str) -> Option<BedrockPlayer>;
}

/// The bridge capability used by the login listener.
pub trait BridgeService: Send + Sync {
    fn kind(&self) -> BridgeKind;

    /// Whether `username` belongs to a connection tunneled by this bridge.
    fn is_bridged_connection(&self, username: &str) -> bool;

    /// The bridged player behind `username`, if any.
    fn bridged_player(&self, username: &str) -> Option<BedrockPlayer>;

    /// A Java account the bridge vouches for, if the player linked one.
    ///
    /// A linked account counts as a verified premium identity.
    fn linked_java_account(&self, username: &str) -> Option<LinkedAccount> {
        self.bridged_player(username).and_then(|p| p.linked)
    }
}
