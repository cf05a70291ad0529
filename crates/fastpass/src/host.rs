//! The proxy-side collaborators FastPass is wired into.
//!
//! FastPass is a guest inside a proxy. Everything it needs from that proxy
//! (plugin lookup, channel and listener registration, player storage and
//! the actual premium check) comes in through the traits below.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::FastPassError;
use crate::listener::{ConnectListener, PluginMessageListener};

/// The proxy plugin FastPass runs as.
pub trait PluginHost: Send + Sync + 'static {
    /// The plugin's registered name. Doubles as the default channel
    /// namespace.
    fn name(&self) -> &str;

    /// Whether another plugin called `name` is loaded.
    fn is_plugin_installed(&self, name: &str) -> bool;

    /// Subscribes to incoming plugin messages on `channel`.
    fn register_channel(&self, channel: &str);

    fn unregister_channel(&self, channel: &str);

    /// Hands a listener to the host's event bus.
    fn register_listener(&self, listener: Listener);

    /// Drops every listener registered by this plugin.
    fn unregister_listeners(&self);
}

/// An event listener handed to [`PluginHost::register_listener`].
///
/// The host keeps the `Arc` and calls the matching `on_*` methods when
/// the corresponding proxy events fire.
#[derive(Clone)]
pub enum Listener {
    Connect(Arc<ConnectListener>),
    PluginMessage(Arc<PluginMessageListener>),
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(_) => f.write_str("Listener::Connect"),
            Self::PluginMessage(_) => f.write_str("Listener::PluginMessage"),
        }
    }
}

/// Persistent player records.
///
/// The write methods may block and are only ever called from the
/// scheduler, never from an event thread.
pub trait PlayerStorage: Send + Sync + 'static {
    /// Opens connections and creates tables. `false` aborts startup.
    fn setup_database(&self) -> bool;

    fn close(&self);

    /// Records whether `player` logs in through premium mode.
    fn save_premium(&self, player: &str, premium: bool) -> Result<(), FastPassError>;

    /// Records that `player` completed a verified login as `uuid`.
    fn save_verified(&self, player: &str, uuid: Uuid) -> Result<(), FastPassError>;
}

/// The standard premium check against the account service.
pub trait PremiumVerifier: Send + Sync + 'static {
    /// Returns the account UUID if `username` belongs to a paid account.
    ///
    /// Blocking is fine: this only runs on the scheduler.
    fn verify(&self, username: &str) -> Result<Option<Uuid>, FastPassError>;
}
