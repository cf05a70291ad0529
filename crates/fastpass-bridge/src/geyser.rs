//! Geyser standalone: protocol translation without Floodgate's account
//! linking.

use std::sync::Arc;

use crate::{BedrockDirectory, BedrockPlayer, BridgeKind, BridgeService, LinkedAccount};

/// [`BridgeService`] backed by the Geyser API.
///
/// Geyser knows which connections it tunnels but never links Java
/// accounts, so it can tell us a player is on Bedrock, never that they
/// are premium.
pub struct GeyserService {
    directory: Arc<dyn BedrockDirectory>,
}

impl GeyserService {
    pub fn new(directory: Arc<dyn BedrockDirectory>) -> Self {
        Self { directory }
    }
}

impl BridgeService for GeyserService {
    fn kind(&self) -> BridgeKind {
        BridgeKind::Geyser
    }

    fn is_bridged_connection(&self, username: &str) -> bool {
        self.directory.find_player(username).is_some()
    }

    fn bridged_player(&self, username: &str) -> Option<BedrockPlayer> {
        self.directory.find_player(username)
    }

    fn linked_java_account(&self, _username: &str) -> Option<LinkedAccount> {
        None
    }
}
