//! In-memory doubles for the host collaborators.
//!
//! Each double records what FastPass asked of it so tests can assert on
//! the exact calls made.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fastpass::prelude::*;
use fastpass::FastPassBuilder;
use fastpass::protocol::ChannelMessage;
use fastpass::scheduler::Job;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PluginHost
// ---------------------------------------------------------------------------

pub struct FakeHost {
    name: String,
    installed: Mutex<HashSet<String>>,
    channels: Mutex<Vec<String>>,
    listeners: Mutex<Vec<Listener>>,
}

impl FakeHost {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            installed: Mutex::new(HashSet::new()),
            channels: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn install(&self, plugin: &str) {
        self.installed.lock().unwrap().insert(plugin.to_owned());
    }

    pub fn channels(&self) -> Vec<String> {
        self.channels.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn connect_listener(&self) -> Arc<ConnectListener> {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .find_map(|l| match l {
                Listener::Connect(l) => Some(Arc::clone(l)),
                Listener::PluginMessage(_) => None,
            })
            .expect("connect listener registered")
    }

    pub fn message_listener(&self) -> Arc<PluginMessageListener> {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .find_map(|l| match l {
                Listener::PluginMessage(l) => Some(Arc::clone(l)),
                Listener::Connect(_) => None,
            })
            .expect("plugin message listener registered")
    }
}

impl PluginHost for FakeHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_plugin_installed(&self, name: &str) -> bool {
        self.installed.lock().unwrap().contains(name)
    }

    fn register_channel(&self, channel: &str) {
        self.channels.lock().unwrap().push(channel.to_owned());
    }

    fn unregister_channel(&self, channel: &str) {
        self.channels.lock().unwrap().retain(|c| c != channel);
    }

    fn register_listener(&self, listener: Listener) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn unregister_listeners(&self) {
        self.listeners.lock().unwrap().clear();
    }
}

// ---------------------------------------------------------------------------
// PlayerStorage
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStorage {
    pub fail_setup: bool,
    pub setup_called: AtomicBool,
    pub closed: AtomicBool,
    pub premium: Mutex<Vec<(String, bool)>>,
    pub verified: Mutex<Vec<(String, Uuid)>>,
}

impl PlayerStorage for FakeStorage {
    fn setup_database(&self) -> bool {
        self.setup_called.store(true, Ordering::SeqCst);
        !self.fail_setup
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn save_premium(&self, player: &str, premium: bool) -> Result<(), FastPassError> {
        self.premium
            .lock()
            .unwrap()
            .push((player.to_owned(), premium));
        Ok(())
    }

    fn save_verified(&self, player: &str, uuid: Uuid) -> Result<(), FastPassError> {
        self.verified.lock().unwrap().push((player.to_owned(), uuid));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PremiumVerifier
// ---------------------------------------------------------------------------

/// Answers from a fixed table. Unknown names are not premium.
#[derive(Default)]
pub struct FakeVerifier {
    premium: HashMap<String, Uuid>,
    failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn premium(mut self, name: &str, uuid: Uuid) -> Self {
        self.premium.insert(name.to_owned(), uuid);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_owned());
        self
    }
}

impl PremiumVerifier for FakeVerifier {
    fn verify(&self, username: &str) -> Result<Option<Uuid>, FastPassError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(username) {
            return Err(FastPassError::Verification("session server timed out".into()));
        }
        Ok(self.premium.get(username).copied())
    }
}

// ---------------------------------------------------------------------------
// Router / BackendServer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeRouter {
    routes: Mutex<HashMap<ConnectionId, Arc<dyn BackendServer>>>,
}

impl FakeRouter {
    pub fn route(&self, connection: ConnectionId, backend: Arc<dyn BackendServer>) {
        self.routes.lock().unwrap().insert(connection, backend);
    }
}

impl Router for FakeRouter {
    fn current_backend_of(&self, connection: ConnectionId) -> Option<Arc<dyn BackendServer>> {
        self.routes.lock().unwrap().get(&connection).cloned()
    }
}

pub struct FakeBackend {
    name: String,
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeBackend {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Decodes every message received on `channel` as `M`.
    pub fn received<M: ChannelMessage>(&self, channel: &str) -> Vec<M> {
        self.sent()
            .into_iter()
            .filter(|(ch, _)| ch == channel)
            .map(|(_, data)| M::from_bytes(&data).expect("valid message"))
            .collect()
    }
}

impl BackendServer for FakeBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_data(&self, channel: &str, data: &[u8]) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_owned(), data.to_vec()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PendingConnection
// ---------------------------------------------------------------------------

static NEXT_CONN: AtomicU64 = AtomicU64::new(1);

pub struct FakeConnection {
    id: ConnectionId,
    name: String,
    online: AtomicBool,
}

impl PendingConnection for FakeConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn username(&self) -> &str {
        &self.name
    }

    fn set_online_mode(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn is_online_mode(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

pub fn connection(name: &str) -> Arc<dyn PendingConnection> {
    Arc::new(FakeConnection {
        id: ConnectionId::new(NEXT_CONN.fetch_add(1, Ordering::Relaxed)),
        name: name.to_owned(),
        online: AtomicBool::new(false),
    })
}

// ---------------------------------------------------------------------------
// AuthPlugin / BedrockDirectory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeHook {
    registered: HashSet<String>,
    pub logins: Mutex<Vec<String>>,
    pub registrations: Mutex<Vec<String>>,
}

impl FakeHook {
    pub fn registered(mut self, name: &str) -> Self {
        self.registered.insert(name.to_owned());
        self
    }
}

impl AuthPlugin for FakeHook {
    fn name(&self) -> &str {
        "FakeAuth"
    }

    fn is_registered(&self, player: &str) -> Result<bool, SessionError> {
        Ok(self.registered.contains(player))
    }

    fn force_login(&self, player: &str) -> Result<bool, SessionError> {
        self.logins.lock().unwrap().push(player.to_owned());
        Ok(true)
    }

    fn force_register(&self, player: &str, password: &str) -> Result<bool, SessionError> {
        assert!(!password.is_empty());
        self.registrations.lock().unwrap().push(player.to_owned());
        Ok(true)
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    players: HashMap<String, BedrockPlayer>,
}

impl FakeDirectory {
    pub fn player(mut self, username: &str, linked: Option<Uuid>) -> Self {
        self.players.insert(
            username.to_owned(),
            BedrockPlayer {
                username: username.to_owned(),
                xuid: "2535400000000001".to_owned(),
                java_uuid: Uuid::from_u128(0xBEEF),
                linked: linked.map(|java_uuid| LinkedAccount {
                    java_uuid,
                    java_username: username.trim_start_matches('.').to_owned(),
                }),
            },
        );
        self
    }
}

impl BedrockDirectory for FakeDirectory {
    fn find_player(&self, username: &str) -> Option<BedrockPlayer> {
        self.players.get(username).cloned()
    }
}

// ---------------------------------------------------------------------------
// Executors
// ---------------------------------------------------------------------------

/// Holds jobs until the test runs them.
#[derive(Default)]
pub struct QueuedExecutor {
    jobs: Mutex<VecDeque<Job>>,
}

impl QueuedExecutor {
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = self.jobs.lock().unwrap().pop_front();
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl Executor for QueuedExecutor {
    fn execute(&self, job: Job) {
        self.jobs.lock().unwrap().push_back(job);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub host: Arc<FakeHost>,
    pub storage: Arc<FakeStorage>,
    pub verifier: Arc<FakeVerifier>,
    pub router: Arc<FakeRouter>,
}

impl Harness {
    pub fn new(verifier: FakeVerifier) -> Self {
        Self::with_storage(verifier, FakeStorage::default())
    }

    pub fn with_storage(verifier: FakeVerifier, storage: FakeStorage) -> Self {
        Self {
            host: FakeHost::new("FastPass"),
            storage: Arc::new(storage),
            verifier: Arc::new(verifier),
            router: Arc::new(FakeRouter::default()),
        }
    }

    /// Builder with every job run inline on the calling thread.
    pub fn builder(&self) -> FastPassBuilder {
        FastPass::builder(
            self.host.clone(),
            self.storage.clone(),
            self.verifier.clone(),
            self.router.clone(),
        )
        .executor(Arc::new(InlineExecutor))
    }

    pub fn enabled(&self, builder: FastPassBuilder) -> FastPass {
        let mut fastpass = builder.build().unwrap();
        fastpass.enable().unwrap();
        fastpass
    }
}
