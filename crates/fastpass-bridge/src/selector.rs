//! One-time choice of the active bridge.
//!
//! Floodgate and Geyser are not meant to run side by side; when both are
//! present Floodgate already drives Geyser. An installed Floodgate settles
//! the choice, and Geyser is only looked at when Floodgate is absent:
//!
//! ```text
//!   floodgate installed? ──yes──→ API handle? ──yes──→ Floodgate
//!          │ no                        └──no (warn)──→ None
//!          ▼
//!   Geyser installed?   ──yes──→ API handle? ──yes──→ Geyser
//!          │ no                        └──no (warn)──→ None
//!          ▼
//!        None
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    BedrockDirectory, BridgeError, BridgeKind, BridgeService, FloodgateService, GeyserService,
};

// ---------------------------------------------------------------------------
// BridgeConfig
// ---------------------------------------------------------------------------

/// Plugin names and Floodgate settings used during bridge selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the Floodgate plugin registers under. Default: `floodgate`.
    pub floodgate_plugin: String,

    /// Name the Geyser plugin registers under. Default: `Geyser-BungeeCord`.
    pub geyser_plugin: String,

    /// Prefix Floodgate puts in front of Bedrock usernames. Default: `.`.
    pub floodgate_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            floodgate_plugin: "floodgate".to_string(),
            geyser_plugin: "Geyser-BungeeCord".to_string(),
            floodgate_prefix: ".".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActiveBridge
// ---------------------------------------------------------------------------

/// The bridge chosen at startup, if any.
///
/// `None` is a perfectly normal state: every player then goes through the
/// standard handshake.
pub enum ActiveBridge {
    None,
    Floodgate(FloodgateService),
    Geyser(GeyserService),
}

impl ActiveBridge {
    /// The unified capability, or `None` when no bridge is active.
    pub fn service(&self) -> Option<&dyn BridgeService> {
        match self {
            Self::None => None,
            Self::Floodgate(service) => Some(service as &dyn BridgeService),
            Self::Geyser(service) => Some(service as &dyn BridgeService),
        }
    }

    pub fn kind(&self) -> Option<BridgeKind> {
        self.service().map(|service| service.kind())
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Debug for ActiveBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "ActiveBridge({kind})"),
            None => f.write_str("ActiveBridge(None)"),
        }
    }
}

// ---------------------------------------------------------------------------
// BridgeSelector
// ---------------------------------------------------------------------------

/// Collects the bridge API handles the host could obtain, then picks one.
///
/// # Example
///
/// ```rust
/// use fastpass_bridge::{BridgeConfig, BridgeSelector};
///
/// let active = BridgeSelector::new(BridgeConfig::default()).select(|_| false);
/// assert!(!active.is_active());
/// ```
pub struct BridgeSelector {
    config: BridgeConfig,
    floodgate: Option<Arc<dyn BedrockDirectory>>,
    geyser: Option<Arc<dyn BedrockDirectory>>,
}

impl BridgeSelector {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            floodgate: None,
            geyser: None,
        }
    }

    /// Supplies the Floodgate API handle.
    pub fn floodgate(mut self, api: Arc<dyn BedrockDirectory>) -> Self {
        self.floodgate = Some(api);
        self
    }

    /// Supplies the Geyser API handle.
    pub fn geyser(mut self, api: Arc<dyn BedrockDirectory>) -> Self {
        self.geyser = Some(api);
        self
    }

    /// Probes the integrations in fixed order and returns the winner.
    ///
    /// `is_installed` answers whether the host has a plugin of the given
    /// name loaded. An installed plugin whose API handle is missing is
    /// logged and yields [`ActiveBridge::None`]. Geyser is never probed
    /// while Floodgate is installed.
    pub fn select(self, is_installed: impl Fn(&str) -> bool) -> ActiveBridge {
        let Self {
            config,
            floodgate,
            geyser,
        } = self;

        if is_installed(&config.floodgate_plugin) {
            return match require(&config.floodgate_plugin, floodgate) {
                Ok(api) => {
                    tracing::info!(bridge = %BridgeKind::Floodgate, "bedrock bridge selected");
                    ActiveBridge::Floodgate(FloodgateService::new(api, config.floodgate_prefix))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "floodgate installed without API, no bedrock bridge");
                    ActiveBridge::None
                }
            };
        }

        if is_installed(&config.geyser_plugin) {
            return match require(&config.geyser_plugin, geyser) {
                Ok(api) => {
                    tracing::info!(bridge = %BridgeKind::Geyser, "bedrock bridge selected");
                    ActiveBridge::Geyser(GeyserService::new(api))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "geyser installed without API, no bedrock bridge");
                    ActiveBridge::None
                }
            };
        }

        tracing::debug!("no bedrock bridge installed");
        ActiveBridge::None
    }
}

fn require(
    plugin: &str,
    api: Option<Arc<dyn BedrockDirectory>>,
) -> Result<Arc<dyn BedrockDirectory>, BridgeError> {
    api.ok_or_else(|| BridgeError::Unavailable {
        plugin: plugin.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use uuid::Uuid;

    use super::*;
    use crate::{BedrockPlayer, LinkedAccount};

    /// In-memory directory keyed by username.
    #[derive(Default)]
    struct Directory(HashMap<String, BedrockPlayer>);

    impl Directory {
        fn with(mut self, username: &str, linked: Option<Uuid>) -> Self {
            self.0.insert(
                username.to_string(),
                BedrockPlayer {
                    username: username.to_string(),
                    xuid: "2535412345678901".to_string(),
                    java_uuid: Uuid::from_u128(1),
                    linked: linked.map(|java_uuid| LinkedAccount {
                        java_uuid,
                        java_username: "Linked".to_string(),
                    }),
                },
            );
            self
        }

        fn shared(self) -> Arc<dyn BedrockDirectory> {
            Arc::new(self)
        }
    }

    impl BedrockDirectory for Directory {
        fn find_player(&self, username: &str) -> Option<BedrockPlayer> {
            self.0.get(username).cloned()
        }
    }

    fn selector() -> BridgeSelector {
        BridgeSelector::new(BridgeConfig::default())
            .floodgate(Directory::default().shared())
            .geyser(Directory::default().shared())
    }

    // =====================================================================
    // select()
    // =====================================================================

    #[test]
    fn test_select_both_installed_prefers_floodgate() {
        let active = selector().select(|_| true);
        assert_eq!(active.kind(), Some(BridgeKind::Floodgate));
    }

    #[test]
    fn test_select_only_geyser_installed() {
        let active = selector().select(|name| name == "Geyser-BungeeCord");
        assert_eq!(active.kind(), Some(BridgeKind::Geyser));
    }

    #[test]
    fn test_select_nothing_installed_returns_none() {
        let active = selector().select(|_| false);
        assert!(!active.is_active());
        assert!(active.service().is_none());
    }

    #[test]
    fn test_select_floodgate_without_handle_never_picks_geyser() {
        let probed = std::cell::RefCell::new(Vec::new());
        let active = BridgeSelector::new(BridgeConfig::default())
            .geyser(Directory::default().shared())
            .select(|name| {
                probed.borrow_mut().push(name.to_string());
                true
            });

        assert!(!active.is_active());
        assert_ne!(active.kind(), Some(BridgeKind::Geyser));
        assert_eq!(*probed.borrow(), vec!["floodgate".to_string()]);
    }

    #[test]
    fn test_select_geyser_without_handle_returns_none() {
        let active = BridgeSelector::new(BridgeConfig::default())
            .floodgate(Directory::default().shared())
            .select(|name| name == "Geyser-BungeeCord");
        assert!(!active.is_active());
    }

    #[test]
    fn test_select_handle_without_plugin_is_ignored() {
        let active = selector().select(|name| name == "something-else");
        assert!(!active.is_active());
    }

    #[test]
    fn test_select_respects_configured_plugin_names() {
        let config = BridgeConfig {
            geyser_plugin: "Geyser-Velocity".to_string(),
            ..BridgeConfig::default()
        };
        let active = BridgeSelector::new(config)
            .geyser(Directory::default().shared())
            .select(|name| name == "Geyser-Velocity");
        assert_eq!(active.kind(), Some(BridgeKind::Geyser));
    }

    // =====================================================================
    // Service behavior through the unified capability
    // =====================================================================

    #[test]
    fn test_floodgate_requires_prefix() {
        let dir = Directory::default()
            .with(".Steve", None)
            .with("Steve", None)
            .shared();
        let active = BridgeSelector::new(BridgeConfig::default())
            .floodgate(dir)
            .select(|_| true);
        let bridge = active.service().unwrap();

        assert!(bridge.is_bridged_connection(".Steve"));
        assert!(!bridge.is_bridged_connection("Steve"));
        assert!(bridge.bridged_player("Steve").is_none());
    }

    #[test]
    fn test_floodgate_linked_account_is_reported() {
        let java = Uuid::from_u128(0xABCD);
        let dir = Directory::default().with(".Linked", Some(java)).shared();
        let active = BridgeSelector::new(BridgeConfig::default())
            .floodgate(dir)
            .select(|_| true);

        let linked = active
            .service()
            .unwrap()
            .linked_java_account(".Linked")
            .expect("linked account expected");
        assert_eq!(linked.java_uuid, java);
    }

    #[test]
    fn test_geyser_never_reports_linked_accounts() {
        let dir = Directory::default()
            .with("Tunnelled", Some(Uuid::from_u128(9)))
            .shared();
        let active = BridgeSelector::new(BridgeConfig::default())
            .geyser(dir)
            .select(|_| true);
        let bridge = active.service().unwrap();

        assert!(bridge.is_bridged_connection("Tunnelled"));
        assert!(bridge.linked_java_account("Tunnelled").is_none());
    }

    // =====================================================================
    // BridgeConfig
    // =====================================================================

    #[test]
    fn test_bridge_config_missing_fields_use_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{ "floodgate_prefix": "*" }"#).unwrap();
        assert_eq!(config.floodgate_prefix, "*");
        assert_eq!(config.floodgate_plugin, "floodgate");
        assert_eq!(config.geyser_plugin, "Geyser-BungeeCord");
    }
}
