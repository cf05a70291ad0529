//! Outbound plugin messages.
//!
//! The dispatcher owns the set of channels FastPass has registered with
//! the host and refuses to send on anything else. Sending is best effort:
//! a backend that is gone or whose buffer rejects the bytes is logged and
//! forgotten, never retried.
//!
//! ```text
//!   message ──→ registered? ──no──→ Err(UnregisteredChannel)
//!                   │ yes
//!                   ▼
//!              to_bytes() ──err──→ Err(ProtocolError)
//!                   │
//!                   ▼
//!   backend.send_data(channel, bytes) ──err──→ Dropped (warn)
//!                   │ ok
//!                   ▼
//!                 Sent
//! ```

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use fastpass_protocol::{ChannelMessage, NamespaceKey, ProtocolError};
use fastpass_transport::BackendServer;

/// What happened to a message handed to [`MessageDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The host accepted the bytes.
    Sent,
    /// There was no destination. Not an error.
    Skipped,
    /// The host refused the bytes; the failure was logged.
    Dropped,
}

/// Sends [`ChannelMessage`]s on this plugin's namespaced channels.
#[derive(Debug)]
pub struct MessageDispatcher {
    namespace: String,
    registered: RwLock<HashSet<NamespaceKey>>,
}

impl MessageDispatcher {
    /// # Errors
    /// [`ProtocolError::InvalidNamespace`] if `namespace` is empty or
    /// contains the channel separator.
    pub fn new(namespace: &str) -> Result<Self, ProtocolError> {
        NamespaceKey::validate_namespace(namespace)?;
        Ok(Self {
            namespace: namespace.to_lowercase(),
            registered: RwLock::new(HashSet::new()),
        })
    }

    /// The lower-cased namespace all channels live under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key for message channel `name` in this namespace.
    pub fn key(&self, name: &str) -> NamespaceKey {
        NamespaceKey::new(&self.namespace, name)
    }

    /// Marks channel `name` as registered and returns its key.
    pub fn register(&self, name: &str) -> NamespaceKey {
        let key = self.key(name);
        self.registered
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        key
    }

    /// Forgets every registered channel and returns them.
    pub fn unregister_all(&self) -> Vec<NamespaceKey> {
        self.registered
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect()
    }

    pub fn is_registered(&self, key: &NamespaceKey) -> bool {
        self.registered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Whether `channel` (combined form) is one of ours.
    pub fn owns_channel(&self, channel: &str) -> bool {
        NamespaceKey::parse(channel).is_some_and(|key| key.namespace() == self.namespace)
    }

    /// Encodes `message` and sends it to `destination`.
    ///
    /// # Errors
    /// - [`ProtocolError::UnregisteredChannel`] if the message's channel
    ///   was never registered
    /// - any encoding error from the message itself
    pub fn dispatch<M: ChannelMessage>(
        &self,
        destination: Option<&dyn BackendServer>,
        message: &M,
    ) -> Result<DispatchOutcome, ProtocolError> {
        let key = self.key(message.channel_name());

        let Some(backend) = destination else {
            tracing::debug!(channel = %key, "no destination server, message skipped");
            return Ok(DispatchOutcome::Skipped);
        };

        if !self.is_registered(&key) {
            return Err(ProtocolError::UnregisteredChannel(
                key.combined_name().to_owned(),
            ));
        }

        let data = message.to_bytes()?;
        match backend.send_data(key.combined_name(), &data) {
            Ok(()) => {
                tracing::trace!(
                    channel = %key,
                    backend = backend.name(),
                    bytes = data.len(),
                    "plugin message sent"
                );
                Ok(DispatchOutcome::Sent)
            }
            Err(e) => {
                tracing::warn!(
                    channel = %key,
                    backend = backend.name(),
                    error = %e,
                    "plugin message dropped"
                );
                Ok(DispatchOutcome::Dropped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fastpass_protocol::{ChangePremiumMessage, SuccessMessage};
    use fastpass_transport::TransportError;
    use uuid::Uuid;

    use super::*;

    /// Backend double that records what it was sent.
    #[derive(Default)]
    struct RecordingBackend {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
        refuse: bool,
    }

    impl BackendServer for RecordingBackend {
        fn name(&self) -> &str {
            "lobby"
        }

        fn send_data(&self, channel: &str, data: &[u8]) -> Result<(), TransportError> {
            if self.refuse {
                return Err(TransportError::SendFailed {
                    channel: channel.to_owned(),
                    reason: "outbound buffer full".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel.to_owned(), data.to_vec()));
            Ok(())
        }
    }

    fn dispatcher() -> MessageDispatcher {
        let d = MessageDispatcher::new("FastPass").unwrap();
        d.register(ChangePremiumMessage::CHANNEL);
        d.register(SuccessMessage::CHANNEL);
        d
    }

    // =====================================================================
    // dispatch()
    // =====================================================================

    #[test]
    fn test_dispatch_no_destination_skipped() {
        let d = dispatcher();
        let outcome = d.dispatch(None, &ChangePremiumMessage::new("Steve", true));
        assert_eq!(outcome.unwrap(), DispatchOutcome::Skipped);
    }

    #[test]
    fn test_dispatch_sends_on_namespaced_channel() {
        let d = dispatcher();
        let backend = RecordingBackend::default();
        let message = ChangePremiumMessage::new("Steve", true);

        let outcome = d.dispatch(Some(&backend), &message).unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent);
        let sent = backend.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "fastpass:switch-mode");
        assert_eq!(ChangePremiumMessage::from_bytes(&sent[0].1).unwrap(), message);
    }

    #[test]
    fn test_new_rejects_namespace_with_separator() {
        assert!(matches!(
            MessageDispatcher::new("fast:pass"),
            Err(ProtocolError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_dispatch_unregistered_channel_rejected() {
        let d = MessageDispatcher::new("fastpass").unwrap();
        d.register(ChangePremiumMessage::CHANNEL);
        let backend = RecordingBackend::default();
        let message = SuccessMessage {
            player_name: "Steve".into(),
            verified_uuid: Uuid::nil(),
            session_token: None,
        };

        let result = d.dispatch(Some(&backend), &message);

        assert!(matches!(
            result,
            Err(ProtocolError::UnregisteredChannel(ref ch)) if ch == "fastpass:success"
        ));
        assert!(backend.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_encode_failure_propagates() {
        let d = dispatcher();
        let backend = RecordingBackend::default();
        let message = ChangePremiumMessage::new("x".repeat(70_000), false);

        let result = d.dispatch(Some(&backend), &message);

        assert!(matches!(result, Err(ProtocolError::StringTooLong { .. })));
    }

    #[test]
    fn test_dispatch_send_failure_dropped() {
        let d = dispatcher();
        let backend = RecordingBackend {
            refuse: true,
            ..Default::default()
        };

        let outcome = d
            .dispatch(Some(&backend), &ChangePremiumMessage::new("Steve", false))
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Dropped);
    }

    // =====================================================================
    // registration
    // =====================================================================

    #[test]
    fn test_unregister_all_clears_channels() {
        let d = dispatcher();
        let removed = d.unregister_all();
        assert_eq!(removed.len(), 2);
        assert!(!d.is_registered(&d.key(SuccessMessage::CHANNEL)));
    }

    #[test]
    fn test_owns_channel_compares_namespace_case_insensitively() {
        let d = dispatcher();
        assert!(d.owns_channel("FastPass:success"));
        assert!(!d.owns_channel("bungeecord:main"));
        assert!(!d.owns_channel("no-separator"));
    }
}
