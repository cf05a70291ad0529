//! Proxy event listeners: where connection events turn into verification.
//!
//! Two listeners are registered with the host at startup:
//!
//! - [`ConnectListener`] follows a player from login start to disconnect
//! - [`PluginMessageListener`] handles messages backends send back
//!
//! The verification flow for one connection:
//!
//! ```text
//!   on_pre_login ──→ Session (Unresolved) ──→ scheduler
//!                                               │
//!              bridged? ──yes──→ linked Java account? → Premium / NotPremium
//!                 │ no
//!                 ▼
//!          PremiumVerifier ──err──→ NotPremium (fail closed)
//!                 │
//!                 ▼
//!          hook says registered offline? ──yes──→ NotPremium
//!                 │ no
//!                 ▼
//!   session.resolve() ──→ set_online_mode ──→ ChangePremiumMessage
//! ```
//!
//! Event methods never block. Anything that might (the premium lookup,
//! the auth plugin, storage) is handed to the [`AsyncScheduler`].

use std::sync::{Arc, Weak};

use fastpass_bridge::{ActiveBridge, BridgeService};
use fastpass_protocol::{ChangePremiumMessage, InboundMessage, SuccessMessage};
use fastpass_scheduler::AsyncScheduler;
use fastpass_session::{
    AuthPlugin, Session, SessionError, SessionStore, VerificationOutcome, VerificationStrategy,
};
use fastpass_transport::{BackendServer, ConnectionId, PendingConnection, Router};
use rand::Rng;
use rand::distr::Alphanumeric;
use uuid::Uuid;

use crate::dispatch::{DispatchOutcome, MessageDispatcher};
use crate::host::{PlayerStorage, PremiumVerifier};
use crate::{FastPassConfig, FastPassError};

const GENERATED_PASSWORD_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything the listeners need, built once per `enable()`.
pub(crate) struct Shared {
    pub(crate) config: FastPassConfig,
    pub(crate) sessions: SessionStore<dyn PendingConnection>,
    pub(crate) dispatcher: MessageDispatcher,
    pub(crate) scheduler: AsyncScheduler,
    pub(crate) router: Arc<dyn Router>,
    pub(crate) storage: Arc<dyn PlayerStorage>,
    pub(crate) verifier: Arc<dyn PremiumVerifier>,
    pub(crate) bridge: ActiveBridge,
    /// Chosen once per `enable()`.
    pub(crate) hook: Option<Arc<dyn AuthPlugin>>,
}

impl Shared {
    fn hook(&self) -> Option<&Arc<dyn AuthPlugin>> {
        self.hook.as_ref()
    }

    fn bridge(&self) -> Option<&dyn BridgeService> {
        self.bridge.service()
    }

    fn strategy_for(&self, username: &str) -> VerificationStrategy {
        match self.bridge() {
            Some(bridge) if bridge.is_bridged_connection(username) => VerificationStrategy::Bridge,
            _ => VerificationStrategy::Handshake,
        }
    }

    /// Runs the blocking part of verification.
    fn verify(
        &self,
        username: &str,
        strategy: VerificationStrategy,
    ) -> Result<(VerificationOutcome, Option<Uuid>), FastPassError> {
        match strategy {
            VerificationStrategy::Bridge => {
                let linked = self
                    .bridge()
                    .and_then(|bridge| bridge.linked_java_account(username));
                Ok(match linked {
                    Some(account) => (VerificationOutcome::Premium, Some(account.java_uuid)),
                    None => (VerificationOutcome::NotPremium, None),
                })
            }
            VerificationStrategy::Handshake => {
                let Some(uuid) = self.verifier.verify(username)? else {
                    return Ok((VerificationOutcome::NotPremium, None));
                };

                if let Some(hook) = self.hook() {
                    if hook.is_registered(username)? {
                        // Cracked account already owns the name on this network.
                        tracing::info!(
                            player = %username,
                            hook = hook.name(),
                            "premium name registered as offline account, staying offline"
                        );
                        return Ok((VerificationOutcome::NotPremium, None));
                    }
                }
                Ok((VerificationOutcome::Premium, Some(uuid)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectListener
// ---------------------------------------------------------------------------

/// Follows a player connection through login.
pub struct ConnectListener {
    shared: Arc<Shared>,
}

impl ConnectListener {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// A client started logging in.
    ///
    /// Creates (or reuses) the connection's session and submits its
    /// verification, at most once per session. Returns immediately.
    pub fn on_pre_login(&self, connection: &Arc<dyn PendingConnection>) -> Arc<Session> {
        let conn_id = connection.id();
        let username = connection.username().to_owned();
        let strategy = self.shared.strategy_for(&username);

        let session = self.shared.sessions.get_or_insert_with(connection, || {
            Session::new(conn_id, username.clone(), strategy)
        });
        if session.outcome().is_resolved() || !session.claim_verification() {
            return session;
        }

        tracing::debug!(%conn_id, player = %username, ?strategy, "verifying login");

        let shared = Arc::clone(&self.shared);
        let connection = Arc::downgrade(connection);
        let task_session = Arc::clone(&session);
        self.shared.scheduler.run_async(move || {
            complete_verification(&shared, &connection, &task_session)
        });

        session
    }

    /// The player was forwarded to `backend`.
    ///
    /// Tells the backend about a premium login, once per backend, and
    /// lets the auth hook log the player in.
    pub fn on_server_connected(
        &self,
        connection: ConnectionId,
        backend: &Arc<dyn BackendServer>,
    ) -> Result<DispatchOutcome, FastPassError> {
        let Some(session) = self.shared.sessions.get_by_id(connection) else {
            return Ok(DispatchOutcome::Skipped);
        };
        if !session.outcome().is_premium() {
            return Ok(DispatchOutcome::Skipped);
        }
        let Some(verified_uuid) = session.verified_uuid() else {
            tracing::warn!(conn_id = %connection, "premium session without a verified UUID");
            return Ok(DispatchOutcome::Skipped);
        };
        if !session.mark_announced(backend.name()) {
            return Ok(DispatchOutcome::Skipped);
        }

        if let Some(hook) = self.shared.hook() {
            let hook = Arc::clone(hook);
            let player = session.username().to_owned();
            let auto_register = self.shared.config.auto_register;
            self.shared
                .scheduler
                .run_async(move || force_login(hook.as_ref(), &player, auto_register));
        }

        let message = SuccessMessage {
            player_name: session.username().to_owned(),
            verified_uuid,
            session_token: Some(session.token().to_vec()),
        };
        let outcome = self
            .shared
            .dispatcher
            .dispatch(Some(&**backend), &message)?;
        tracing::info!(
            conn_id = %connection,
            player = %session.username(),
            backend = backend.name(),
            ?outcome,
            "announced verified login"
        );
        Ok(outcome)
    }

    /// The connection closed. Frees its session right away.
    pub fn on_disconnect(&self, connection: ConnectionId) {
        if let Some(session) = self.shared.sessions.evict(connection) {
            tracing::debug!(
                conn_id = %connection,
                player = %session.username(),
                age_ms = session.age().as_millis() as u64,
                "login session closed"
            );
        }
    }
}

/// Scheduler half of [`ConnectListener::on_pre_login`].
fn complete_verification(
    shared: &Shared,
    connection: &Weak<dyn PendingConnection>,
    session: &Arc<Session>,
) -> Result<(), FastPassError> {
    let conn_id = session.connection();
    let username = session.username();

    let (outcome, uuid) = shared
        .verify(username, session.strategy())
        .unwrap_or_else(|e| {
            tracing::warn!(%conn_id, player = %username, error = %e, "verification failed, treating as offline");
            (VerificationOutcome::NotPremium, None)
        });

    // The player may have left while we were waiting on the lookup.
    let Some(connection) = connection.upgrade() else {
        tracing::debug!(%conn_id, "connection closed before verification finished");
        return Ok(());
    };
    let still_current = shared
        .sessions
        .get_by_id(conn_id)
        .is_some_and(|current| Arc::ptr_eq(&current, session));
    if !still_current {
        tracing::debug!(%conn_id, "session replaced before verification finished");
        return Ok(());
    }

    match session.resolve(outcome, uuid) {
        Ok(()) => {}
        Err(SessionError::AlreadyResolved { .. }) => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    if outcome.is_premium() && session.strategy() == VerificationStrategy::Handshake {
        connection.set_online_mode(true);
    }

    let backend = shared.router.current_backend_of(conn_id);
    shared.dispatcher.dispatch(
        backend.as_deref(),
        &ChangePremiumMessage::new(username, outcome.is_premium()),
    )?;
    Ok(())
}

fn force_login(hook: &dyn AuthPlugin, player: &str, auto_register: bool) -> Result<(), FastPassError> {
    let done = if hook.is_registered(player)? {
        hook.force_login(player)?
    } else if auto_register {
        hook.force_register(player, &generate_password())?
    } else {
        return Ok(());
    };

    if !done {
        tracing::warn!(player = %player, hook = hook.name(), "auth plugin refused forced login");
    }
    Ok(())
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// PluginMessageListener
// ---------------------------------------------------------------------------

/// Who sent an incoming plugin message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    /// A backend server, by name.
    Backend(String),
    /// A player's client.
    Player(ConnectionId),
}

/// What the listener did with an incoming plugin message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVerdict {
    /// Not on one of our channels.
    Ignored,
    /// On our channel but from a client. The host should cancel the event
    /// so it is not forwarded either.
    Rejected,
    /// Decoded and queued for storage.
    Accepted,
}

/// Handles messages backends send on our channels.
pub struct PluginMessageListener {
    shared: Arc<Shared>,
}

impl PluginMessageListener {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn on_plugin_message(
        &self,
        source: &MessageSource,
        channel: &str,
        data: &[u8],
    ) -> Result<MessageVerdict, FastPassError> {
        let dispatcher = &self.shared.dispatcher;
        if !dispatcher.owns_channel(channel) {
            return Ok(MessageVerdict::Ignored);
        }

        let backend = match source {
            MessageSource::Backend(name) => name,
            MessageSource::Player(conn_id) => {
                tracing::warn!(%conn_id, channel, "client sent a message on a private channel");
                return Ok(MessageVerdict::Rejected);
            }
        };

        let Some(message) = InboundMessage::decode(dispatcher.namespace(), channel, data)? else {
            return Ok(MessageVerdict::Ignored);
        };
        tracing::debug!(backend = %backend, player = message.player_name(), channel, "plugin message received");

        let storage = Arc::clone(&self.shared.storage);
        self.shared.scheduler.run_async(move || match message {
            InboundMessage::ChangePremium(m) => storage.save_premium(&m.player_name, m.will_enable),
            InboundMessage::Success(m) => storage.save_verified(&m.player_name, m.verified_uuid),
        });
        Ok(MessageVerdict::Accepted)
    }
}
