//! The session store: which pending connection has which login session.
//!
//! Connections belong to the host. The store only holds a [`Weak`]
//! reference to each one, so it can never keep a closed connection alive.
//! An entry whose connection has been dropped is "dead": lookups ignore
//! it, and it is swept out of the map the next time a `put` finds the
//! map at its purge threshold. The host may also evict entries directly
//! when it sees a disconnect, which frees them straight away.
//!
//! # Concurrency note
//!
//! Backed by a [`DashMap`], so connection-handling threads can read and
//! write concurrently without any external lock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use fastpass_transport::{ConnectionId, PendingConnection};

use crate::{Session, SessionConfig};

struct Slot<C: ?Sized> {
    connection: Weak<C>,
    session: Arc<Session>,
}

impl<C: ?Sized> Slot<C> {
    fn is_alive(&self) -> bool {
        self.connection.strong_count() > 0
    }
}

/// Concurrent map from pending connection to its [`Session`].
///
/// `C` is the host's connection type, usually `dyn PendingConnection`.
///
/// ## Lifecycle
///
/// ```text
/// put() ──→ [live] ──(host drops connection)──→ [dead] ──→ purge
///              │
///              └──(evict on disconnect)──→ gone
/// ```
pub struct SessionStore<C: ?Sized> {
    entries: DashMap<ConnectionId, Slot<C>>,
    next_purge_at: AtomicUsize,
    config: SessionConfig,
}

impl<C: PendingConnection + ?Sized> SessionStore<C> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            entries: DashMap::new(),
            next_purge_at: AtomicUsize::new(config.purge_threshold),
            config,
        }
    }

    /// Looks up the session of a connection.
    pub fn get(&self, connection: &C) -> Option<Arc<Session>> {
        self.get_by_id(connection.id())
    }

    /// Looks up a session by connection id.
    ///
    /// Returns `None` if there is no entry or its connection was dropped.
    pub fn get_by_id(&self, id: ConnectionId) -> Option<Arc<Session>> {
        let slot = self.entries.get(&id)?;
        slot.is_alive().then(|| Arc::clone(&slot.session))
    }

    /// Stores `session` for `connection`, replacing any previous one.
    pub fn put(&self, connection: &Arc<C>, session: Session) -> Arc<Session> {
        self.maybe_purge();

        let session = Arc::new(session);
        self.entries.insert(
            connection.id(),
            Slot {
                connection: Arc::downgrade(connection),
                session: Arc::clone(&session),
            },
        );
        session
    }

    /// Returns the live session of `connection`, creating it with `make` if
    /// there is none.
    ///
    /// Concurrent callers for the same connection all get the same session.
    pub fn get_or_insert_with(
        &self,
        connection: &Arc<C>,
        make: impl FnOnce() -> Session,
    ) -> Arc<Session> {
        self.maybe_purge();

        let slot = |session: &Arc<Session>| Slot {
            connection: Arc::downgrade(connection),
            session: Arc::clone(session),
        };

        match self.entries.entry(connection.id()) {
            Entry::Occupied(entry) if entry.get().is_alive() => {
                Arc::clone(&entry.get().session)
            }
            Entry::Occupied(mut entry) => {
                let session = Arc::new(make());
                entry.insert(slot(&session));
                session
            }
            Entry::Vacant(entry) => {
                let session = Arc::new(make());
                entry.insert(slot(&session));
                session
            }
        }
    }

    /// Removes the entry for `id`, returning its session if it had one.
    ///
    /// Evicting an unknown id is not an error.
    pub fn evict(&self, id: ConnectionId) -> Option<Arc<Session>> {
        let removed = self.entries.remove(&id).map(|(_, slot)| slot.session);
        if removed.is_some() {
            tracing::trace!(conn_id = %id, "session evicted");
        }
        removed
    }

    /// Drops every entry whose connection no longer exists.
    ///
    /// Returns how many entries were removed.
    pub fn purge_dead(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.is_alive());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "purged sessions of closed connections");
        }
        removed
    }

    /// Number of entries, including dead ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn maybe_purge(&self) {
        if self.entries.len() < self.next_purge_at.load(Ordering::Relaxed) {
            return;
        }
        self.purge_dead();
        let next = (self.entries.len() * 2).max(self.config.purge_threshold);
        self.next_purge_at.store(next, Ordering::Relaxed);
    }
}

impl<C: PendingConnection + ?Sized> Default for SessionStore<C> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
