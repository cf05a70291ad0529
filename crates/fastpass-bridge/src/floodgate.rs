//! Floodgate: the bridge that lets Bedrock players join online-mode
//! networks without a Java account.

use std::sync::Arc;

use crate::{BedrockDirectory, BedrockPlayer, BridgeKind, BridgeService};

/// [`BridgeService`] backed by the Floodgate API.
///
/// Floodgate prefixes Bedrock usernames (by default with `.`) so they can't
/// clash with Java names. A name without the prefix is never a Floodgate
/// player, which saves a directory lookup for every Java login.
pub struct FloodgateService {
    directory: Arc<dyn BedrockDirectory>,
    username_prefix: String,
}

impl FloodgateService {
    pub fn new(directory: Arc<dyn BedrockDirectory>, username_prefix: impl Into<String>) -> Self {
        Self {
            directory,
            username_prefix: username_prefix.into(),
        }
    }

    pub fn username_prefix(&self) -> &str {
        &self.username_prefix
    }
}

impl BridgeService for FloodgateService {
    fn kind(&self) -> BridgeKind {
        BridgeKind::Floodgate
    }

    fn is_bridged_connection(&self, username: &str) -> bool {
        username.starts_with(self.username_prefix.as_str())
            && self.directory.find_player(username).is_some()
    }

    fn bridged_player(&self, username: &str) -> Option<BedrockPlayer> {
        if !username.starts_with(self.username_prefix.as_str()) {
            return None;
        }
        self.directory.find_player(username)
    }
}
