//! Messages exchanged between the proxy and its backends.
//!
//! Every message knows which channel it travels on and how to write itself
//! into (and read itself out of) a byte buffer. No schema travels with the
//! payload: a receiver that knows the channel knows the layout.
//!
//! | Channel name  | Message                  | Direction         |
//! |---------------|--------------------------|-------------------|
//! | `switch-mode` | [`ChangePremiumMessage`] | both ways         |
//! | `success`     | [`SuccessMessage`]       | both ways         |

use bytes::{Buf, BufMut, BytesMut};
use uuid::Uuid;

use crate::codec::{
    read_bool, read_optional_bytes, read_string, read_uuid, write_bool,
    write_optional_bytes, write_string, write_uuid,
};
use crate::{NamespaceKey, ProtocolError};

/// A payload that can be sent over a namespaced plugin channel.
///
/// `write_to` and `read_from` must be exact inverses:
/// `M::from_bytes(&m.to_bytes()?)? == m` for every valid `m`.
pub trait ChannelMessage: Sized {
    /// Channel name (without namespace) this message type travels on.
    const CHANNEL: &'static str;

    /// Appends the message to `buf`.
    ///
    /// # Errors
    /// Fails when a field cannot be represented, e.g. an oversized name.
    fn write_to(&self, buf: &mut impl BufMut) -> Result<(), ProtocolError>;

    /// Reads one message from the front of `buf`.
    fn read_from(buf: &mut impl Buf) -> Result<Self, ProtocolError>;

    /// Channel name of this message.
    fn channel_name(&self) -> &'static str {
        Self::CHANNEL
    }

    /// Encodes the message into a fresh byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decodes a message that must span the whole of `data`.
    ///
    /// # Errors
    /// Besides field errors, [`ProtocolError::TrailingBytes`] when `data`
    /// holds more than one message.
    fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut input = data;
        let message = Self::read_from(&mut input)?;
        if input.has_remaining() {
            return Err(ProtocolError::TrailingBytes(input.remaining()));
        }
        Ok(message)
    }
}

// ---------------------------------------------------------------------------
// ChangePremiumMessage
// ---------------------------------------------------------------------------

/// Tells the other side that a player's premium flag changed.
///
/// The proxy sends it after a login has been verified. Backends send it
/// back when a player toggles premium mode with a command there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePremiumMessage {
    pub player_name: String,

    /// `true` to mark the player premium, `false` to mark them offline.
    pub will_enable: bool,

    /// Whether the player changed their own status (as opposed to an
    /// operator doing it for them).
    pub source_invoker: bool,
}

impl ChangePremiumMessage {
    pub fn new(player_name: impl Into<String>, will_enable: bool) -> Self {
        Self {
            player_name: player_name.into(),
            will_enable,
            source_invoker: false,
        }
    }
}

impl ChannelMessage for ChangePremiumMessage {
    const CHANNEL: &'static str = "switch-mode";

    fn write_to(&self, buf: &mut impl BufMut) -> Result<(), ProtocolError> {
        write_string(buf, &self.player_name)?;
        write_bool(buf, self.will_enable);
        write_bool(buf, self.source_invoker);
        Ok(())
    }

    fn read_from(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        Ok(Self {
            player_name: read_string(buf)?,
            will_enable: read_bool(buf)?,
            source_invoker: read_bool(buf)?,
        })
    }
}

// ---------------------------------------------------------------------------
// SuccessMessage
// ---------------------------------------------------------------------------

/// Announces a verified premium login to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessMessage {
    pub player_name: String,

    /// The account UUID the verification produced.
    pub verified_uuid: Uuid,

    /// Opaque per-session token, if the proxy issued one.
    pub session_token: Option<Vec<u8>>,
}

impl ChannelMessage for SuccessMessage {
    const CHANNEL: &'static str = "success";

    fn write_to(&self, buf: &mut impl BufMut) -> Result<(), ProtocolError> {
        write_string(buf, &self.player_name)?;
        write_uuid(buf, &self.verified_uuid);
        write_optional_bytes(buf, self.session_token.as_deref())
    }

    fn read_from(buf: &mut impl Buf) -> Result<Self, ProtocolError> {
        Ok(Self {
            player_name: read_string(buf)?,
            verified_uuid: read_uuid(buf)?,
            session_token: read_optional_bytes(buf)?,
        })
    }
}

// ---------------------------------------------------------------------------
// InboundMessage
// ---------------------------------------------------------------------------

/// A decoded message received from a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    ChangePremium(ChangePremiumMessage),
    Success(SuccessMessage),
}

impl InboundMessage {
    /// Decodes a plugin message that arrived on `channel`.
    ///
    /// Returns `Ok(None)` for channels outside `namespace`: those belong to
    /// other plugins and are none of our business.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownChannel`] for an unrecognised name inside our
    /// namespace, or any decode error of the matching message type.
    pub fn decode(
        namespace: &str,
        channel: &str,
        data: &[u8],
    ) -> Result<Option<Self>, ProtocolError> {
        let Some(key) = NamespaceKey::parse(channel) else {
            return Ok(None);
        };
        if key.namespace() != namespace.to_lowercase() {
            return Ok(None);
        }

        let name = key.name();
        if name == ChangePremiumMessage::CHANNEL {
            ChangePremiumMessage::from_bytes(data).map(|m| Some(Self::ChangePremium(m)))
        } else if name == SuccessMessage::CHANNEL {
            SuccessMessage::from_bytes(data).map(|m| Some(Self::Success(m)))
        } else {
            Err(ProtocolError::UnknownChannel(channel.to_owned()))
        }
    }

    pub fn player_name(&self) -> &str {
        match self {
            Self::ChangePremium(m) => &m.player_name,
            Self::Success(m) => &m.player_name,
        }
    }
}
