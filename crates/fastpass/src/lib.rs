//! # FastPass
//!
//! Premium-login correlation for game proxies.
//!
//! For every player connecting through the proxy, FastPass decides, off the
//! network thread, whether they own a paid account, remembers that decision
//! for as long as the connection lives, and tells the backend server the
//! player ends up on over a private plugin channel. Bedrock players arriving
//! through Floodgate or Geyser are verified by the bridge instead, and an
//! installed auth plugin can be driven to log verified players in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fastpass::prelude::*;
//!
//! // Implement PluginHost, PlayerStorage, PremiumVerifier and Router for
//! // your proxy, then:
//! // let mut fastpass = FastPass::builder(host, storage, verifier, router)
//! //     .config(FastPassConfig::default())
//! //     .build()?;
//! // fastpass.enable()?;
//! ```
//!
//! ## Layers
//!
//! ```text
//! fastpass (this crate)    listeners, dispatcher, lifecycle
//!     ├── fastpass-session    sessions, store, auth hooks
//!     ├── fastpass-bridge     Floodgate / Geyser selection
//!     ├── fastpass-protocol   channels and message codec
//!     ├── fastpass-scheduler  off-thread task submission
//!     └── fastpass-transport  host connection traits
//! ```

pub mod config;
pub mod dispatch;
pub mod host;
pub mod listener;
pub mod logging;

mod error;
mod plugin;

pub use config::{FastPassConfig, LoggingConfig};
pub use error::FastPassError;
pub use plugin::{FastPass, FastPassBuilder, LifecycleState};

pub use fastpass_bridge as bridge;
pub use fastpass_protocol as protocol;
pub use fastpass_scheduler as scheduler;
pub use fastpass_session as session;
pub use fastpass_transport as transport;

/// Everything a host integration usually needs.
pub mod prelude {
    pub use crate::dispatch::DispatchOutcome;
    pub use crate::host::{Listener, PlayerStorage, PluginHost, PremiumVerifier};
    pub use crate::listener::{
        ConnectListener, MessageSource, MessageVerdict, PluginMessageListener,
    };
    pub use crate::{FastPass, FastPassConfig, FastPassError, LifecycleState};

    pub use fastpass_bridge::{BedrockDirectory, BedrockPlayer, BridgeKind, LinkedAccount};
    pub use fastpass_scheduler::{Executor, InlineExecutor, TokioExecutor};
    pub use fastpass_session::{
        AuthPlugin, Session, SessionError, VerificationOutcome, VerificationStrategy,
    };
    pub use fastpass_transport::{
        BackendServer, ConnectionId, PendingConnection, Router, TransportError,
    };
}
