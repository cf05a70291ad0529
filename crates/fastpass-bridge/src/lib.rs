//! Bedrock bridge integration for FastPass.
//!
//! Players on Bedrock Edition reach a Java proxy through a bridge plugin:
//! either Floodgate (with account linking) or standalone Geyser. At most one
//! is active per process. [`BridgeSelector`] decides which at startup and
//! hands back an [`ActiveBridge`]; the rest of FastPass only ever talks to
//! the [`BridgeService`] it exposes.

mod error;
mod floodgate;
mod geyser;
mod selector;
mod service;

pub use error::BridgeError;
pub use floodgate::FloodgateService;
pub use geyser::GeyserService;
pub use selector::{ActiveBridge, BridgeConfig, BridgeSelector};
pub use service::{BedrockDirectory, BedrockPlayer, BridgeKind, BridgeService, LinkedAccount};
