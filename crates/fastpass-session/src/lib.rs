//! Login session management for FastPass.
//!
//! This crate handles what the proxy remembers about a login in progress:
//!
//! 1. **Sessions**: one [`Session`] per pending connection, holding the
//!    verification outcome
//! 2. **Session store**: [`SessionStore`], a concurrent map that forgets
//!    a session once its connection is gone
//! 3. **Auth hooks**: the [`AuthPlugin`] trait and the [`HookRegistry`]
//!    that picks at most one adapter at startup
//!
//! # How it fits in the stack
//!
//! ```text
//! FastPass (above)  ← listeners create sessions and resolve them
//!     ↕
//! Session Layer (this crate)  ← per-connection verification state
//!     ↕
//! Transport Layer (below)  ← provides ConnectionId, PendingConnection
//! ```

mod auth;
mod error;
mod hook;
mod session;
mod store;

pub use auth::AuthPlugin;
pub use error::SessionError;
pub use hook::{HookFactory, HookRegistry};
pub use session::{Session, SessionConfig, VerificationOutcome, VerificationStrategy};
pub use store::SessionStore;
