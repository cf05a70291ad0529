//! Plugin-message protocol for FastPass.
//!
//! This crate defines what the proxy and its backends say to each other
//! outside of the game protocol:
//!
//! - **Channels** ([`NamespaceKey`]): `<namespace>:<name>` identifiers
//!   that keep our messages apart from everyone else's.
//! - **Messages** ([`ChannelMessage`], [`ChangePremiumMessage`],
//!   [`SuccessMessage`]): self-encoding payloads.
//! - **Codec** ([`codec`]): the primitive readers and writers the
//!   messages are built from.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! ```text
//! Session (outcome) → Protocol (bytes on a channel) → Transport (backend)
//! ```

pub mod codec;

mod channel;
mod error;
mod message;

pub use channel::{NamespaceKey, SEPARATOR};
pub use error::ProtocolError;
pub use message::{ChangePremiumMessage, ChannelMessage, InboundMessage, SuccessMessage};
