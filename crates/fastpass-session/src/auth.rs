//! Hook into a third-party authentication plugin.
//!
//! Offline-mode networks usually run a password plugin (AuthMe style) so
//! that nobody can join as someone else. Once FastPass has proven that a
//! player owns their account, the password prompt is pointless, so we ask
//! the auth plugin to log them in directly.
//!
//! FastPass doesn't know any auth plugin's API. Instead it defines the
//! [`AuthPlugin`] trait, and an adapter per supported plugin implements it.
//! Adapters are picked at startup by the [`HookRegistry`](crate::HookRegistry).
//!
//! Calls may block (most plugins hit a database), so they are only ever made
//! from the async scheduler, never from a connection thread.

use crate::SessionError;

/// Adapter around a third-party authentication plugin.
///
/// # Example
///
/// ```rust
/// use fastpass_session::{AuthPlugin, SessionError};
///
/// /// Treats every player as already registered.
/// struct OpenDoor;
///
/// impl AuthPlugin for OpenDoor {
///     fn name(&self) -> &str {
///         "OpenDoor"
///     }
///
///     fn is_registered(&self, _player: &str) -> Result<bool, SessionError> {
///         Ok(true)
///     }
///
///     fn force_login(&self, _player: &str) -> Result<bool, SessionError> {
///         Ok(true)
///     }
///
///     fn force_register(&self, _player: &str, _password: &str) -> Result<bool, SessionError> {
///         Ok(true)
///     }
/// }
/// ```
pub trait AuthPlugin: Send + Sync + 'static {
    /// Name of the plugin this adapter talks to.
    fn name(&self) -> &str;

    /// Whether `player` has an account (with a password) in the auth plugin.
    ///
    /// # Errors
    /// [`SessionError::Hook`] if the plugin could not answer.
    fn is_registered(&self, player: &str) -> Result<bool, SessionError>;

    /// Logs `player` in without asking for a password.
    ///
    /// Returns `Ok(false)` if the plugin refused (e.g. player not online).
    fn force_login(&self, player: &str) -> Result<bool, SessionError>;

    /// Creates an account for `player` with `password` and logs them in.
    fn force_register(&self, player: &str, password: &str) -> Result<bool, SessionError>;
}
