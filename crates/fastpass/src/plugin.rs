//! The `FastPass` orchestrator: builder and enable/disable lifecycle.
//!
//! This is the entry point for a host. It ties the layers together:
//! storage → bridge → auth hook → listeners → channels.
//!
//! ```text
//!   Disabled ──enable()──→ Initializing ──→ Running
//!      ▲                       │ storage setup failed
//!      │                       ▼
//!      ├───────────────── (StartupAborted)
//!      │
//!      └──── Disabling ←──disable()── Running
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fastpass_bridge::{ActiveBridge, BedrockDirectory, BridgeKind, BridgeSelector};
use fastpass_protocol::{ChangePremiumMessage, ChannelMessage, SuccessMessage};
use fastpass_scheduler::{AsyncScheduler, Executor, TokioExecutor};
use fastpass_session::{AuthPlugin, HookRegistry, SessionError, SessionStore};
use fastpass_transport::Router;

use crate::dispatch::MessageDispatcher;
use crate::host::{Listener, PlayerStorage, PluginHost, PremiumVerifier};
use crate::listener::{ConnectListener, PluginMessageListener, Shared};
use crate::{FastPassConfig, FastPassError};

/// Where a [`FastPass`] instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Disabled,
    Initializing,
    Running,
    Disabling,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Disabling => "disabling",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`FastPass`] instance.
///
/// # Example
///
/// ```rust,ignore
/// let mut fastpass = FastPass::builder(host, storage, verifier, router)
///     .config(config)
///     .floodgate_api(floodgate)
///     .auth_hook("AuthMe", |host| Ok(Arc::new(AuthMeHook::new(host))))
///     .build()?;
/// fastpass.enable()?;
/// ```
pub struct FastPassBuilder {
    host: Arc<dyn PluginHost>,
    storage: Arc<dyn PlayerStorage>,
    verifier: Arc<dyn PremiumVerifier>,
    router: Arc<dyn Router>,
    config: FastPassConfig,
    executor: Option<Arc<dyn Executor>>,
    floodgate: Option<Arc<dyn BedrockDirectory>>,
    geyser: Option<Arc<dyn BedrockDirectory>>,
    hooks: HookRegistry<dyn PluginHost>,
}

impl FastPassBuilder {
    pub fn new(
        host: Arc<dyn PluginHost>,
        storage: Arc<dyn PlayerStorage>,
        verifier: Arc<dyn PremiumVerifier>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            host,
            storage,
            verifier,
            router,
            config: FastPassConfig::default(),
            executor: None,
            floodgate: None,
            geyser: None,
            hooks: HookRegistry::new(),
        }
    }

    pub fn config(mut self, config: FastPassConfig) -> Self {
        self.config = config;
        self
    }

    /// Where blocking work runs. Defaults to the current Tokio runtime's
    /// blocking pool.
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// The Floodgate API handle, if the host could obtain one.
    pub fn floodgate_api(mut self, api: Arc<dyn BedrockDirectory>) -> Self {
        self.floodgate = Some(api);
        self
    }

    /// The Geyser API handle, if the host could obtain one.
    pub fn geyser_api(mut self, api: Arc<dyn BedrockDirectory>) -> Self {
        self.geyser = Some(api);
        self
    }

    /// Adds an auth plugin adapter. Adapters are tried in the order added.
    pub fn auth_hook(
        mut self,
        plugin_name: impl Into<String>,
        factory: impl Fn(&dyn PluginHost) -> Result<Arc<dyn AuthPlugin>, SessionError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.hooks = self
            .hooks
            .with_candidate(plugin_name, move |host| factory(host));
        self
    }

    /// # Errors
    /// [`FastPassError::NoExecutor`] if no executor was set and this is
    /// not called from inside a Tokio runtime.
    pub fn build(self) -> Result<FastPass, FastPassError> {
        let executor: Arc<dyn Executor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(TokioExecutor::try_current().ok_or(FastPassError::NoExecutor)?),
        };

        Ok(FastPass {
            host: self.host,
            storage: self.storage,
            verifier: self.verifier,
            router: self.router,
            config: self.config,
            scheduler: AsyncScheduler::new(executor),
            floodgate: self.floodgate,
            geyser: self.geyser,
            hooks: self.hooks,
            state: LifecycleState::Disabled,
            shared: None,
        })
    }
}

// ---------------------------------------------------------------------------
// FastPass
// ---------------------------------------------------------------------------

/// A FastPass instance bound to one host plugin.
///
/// Call [`enable()`](Self::enable) when the host enables the plugin and
/// [`disable()`](Self::disable) when it shuts it down.
pub struct FastPass {
    host: Arc<dyn PluginHost>,
    storage: Arc<dyn PlayerStorage>,
    verifier: Arc<dyn PremiumVerifier>,
    router: Arc<dyn Router>,
    config: FastPassConfig,
    scheduler: AsyncScheduler,
    floodgate: Option<Arc<dyn BedrockDirectory>>,
    geyser: Option<Arc<dyn BedrockDirectory>>,
    hooks: HookRegistry<dyn PluginHost>,
    state: LifecycleState,
    shared: Option<Arc<Shared>>,
}

impl FastPass {
    pub fn builder(
        host: Arc<dyn PluginHost>,
        storage: Arc<dyn PlayerStorage>,
        verifier: Arc<dyn PremiumVerifier>,
        router: Arc<dyn Router>,
    ) -> FastPassBuilder {
        FastPassBuilder::new(host, storage, verifier, router)
    }

    /// Brings the plugin up.
    ///
    /// Order: namespace check, storage, bridge, auth hook, listeners,
    /// channels. If the namespace is unusable or storage setup fails
    /// nothing is registered and the instance stays disabled.
    ///
    /// # Errors
    /// - [`FastPassError::InvalidState`] unless currently disabled
    /// - [`FastPassError::StartupAborted`] if the channel namespace is
    ///   invalid or storage setup failed
    pub fn enable(&mut self) -> Result<(), FastPassError> {
        if self.state != LifecycleState::Disabled {
            return Err(FastPassError::InvalidState(self.state));
        }
        self.state = LifecycleState::Initializing;
        let plugin = self.host.name().to_owned();
        tracing::info!(%plugin, "enabling");

        let namespace = self.config.namespace.clone().unwrap_or_else(|| plugin.clone());
        let dispatcher = match MessageDispatcher::new(&namespace) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                self.state = LifecycleState::Disabled;
                tracing::error!(%plugin, error = %e, "unusable channel namespace, staying disabled");
                return Err(FastPassError::StartupAborted(e.to_string()));
            }
        };

        if !self.storage.setup_database() {
            self.state = LifecycleState::Disabled;
            tracing::error!(%plugin, "storage setup failed, staying disabled");
            return Err(FastPassError::StartupAborted(
                "storage setup failed".to_string(),
            ));
        }

        let bridge = self.select_bridge();
        let host = self.host.as_ref();
        let hook = self.hooks.select(host, |name| host.is_plugin_installed(name));

        let channels = [
            dispatcher.register(ChangePremiumMessage::CHANNEL),
            dispatcher.register(SuccessMessage::CHANNEL),
        ];

        let shared = Arc::new(Shared {
            config: self.config.clone(),
            sessions: SessionStore::new(self.config.session_config()),
            dispatcher,
            scheduler: self.scheduler.clone(),
            router: Arc::clone(&self.router),
            storage: Arc::clone(&self.storage),
            verifier: Arc::clone(&self.verifier),
            bridge,
            hook,
        });

        self.host.register_listener(Listener::Connect(Arc::new(ConnectListener::new(
            Arc::clone(&shared),
        ))));
        self.host
            .register_listener(Listener::PluginMessage(Arc::new(PluginMessageListener::new(
                Arc::clone(&shared),
            ))));

        for channel in &channels {
            self.host.register_channel(channel.combined_name());
        }

        tracing::info!(
            %plugin,
            namespace = %shared.dispatcher.namespace(),
            bridge = ?shared.bridge.kind(),
            hook = shared.hook.as_ref().map(|h| h.name()),
            "enabled"
        );
        self.shared = Some(shared);
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Shuts the plugin down. A no-op when already disabled.
    ///
    /// In-flight verification tasks are not waited for; their results are
    /// discarded because the sessions they belong to are gone. Use
    /// [`wait_for_pending`](Self::wait_for_pending) first to let them
    /// finish.
    ///
    /// # Errors
    /// [`FastPassError::InvalidState`] while initializing or disabling.
    pub fn disable(&mut self) -> Result<(), FastPassError> {
        match self.state {
            LifecycleState::Disabled => return Ok(()),
            LifecycleState::Running => {}
            other => return Err(FastPassError::InvalidState(other)),
        }
        self.state = LifecycleState::Disabling;

        self.host.unregister_listeners();
        if let Some(shared) = self.shared.take() {
            for channel in shared.dispatcher.unregister_all() {
                self.host.unregister_channel(channel.combined_name());
            }
            shared.sessions.clear();
        }
        self.storage.close();

        self.state = LifecycleState::Disabled;
        tracing::info!(plugin = %self.host.name(), "disabled");
        Ok(())
    }

    /// Waits for submitted verification and storage tasks to finish.
    ///
    /// Returns `false` if some were still running after `timeout`.
    pub async fn wait_for_pending(&self, timeout: Duration) -> bool {
        self.scheduler.wait_idle(timeout).await
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn config(&self) -> &FastPassConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &AsyncScheduler {
        &self.scheduler
    }

    /// The bridge chosen at the last `enable()`, while running.
    pub fn active_bridge(&self) -> Option<BridgeKind> {
        self.shared.as_ref().and_then(|s| s.bridge.kind())
    }

    /// Name of the active auth plugin hook, while running.
    pub fn auth_hook_name(&self) -> Option<&str> {
        self.shared
            .as_ref()
            .and_then(|s| s.hook.as_ref())
            .map(|hook| hook.name())
    }

    /// Channel namespace in use, while running.
    pub fn namespace(&self) -> Option<&str> {
        self.shared.as_ref().map(|s| s.dispatcher.namespace())
    }

    /// Sessions currently tracked, dead ones not yet purged included.
    pub fn session_count(&self) -> usize {
        self.shared.as_ref().map_or(0, |s| s.sessions.len())
    }

    fn select_bridge(&self) -> ActiveBridge {
        let mut selector = BridgeSelector::new(self.config.bridge.clone());
        if let Some(api) = &self.floodgate {
            selector = selector.floodgate(Arc::clone(api));
        }
        if let Some(api) = &self.geyser {
            selector = selector.geyser(Arc::clone(api));
        }
        let host = self.host.as_ref();
        selector.select(|name| host.is_plugin_installed(name))
    }
}

impl fmt::Debug for FastPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastPass")
            .field("plugin", &self.host.name())
            .field("state", &self.state)
            .field("bridge", &self.active_bridge())
            .field("hook", &self.auth_hook_name())
            .finish()
    }
}
