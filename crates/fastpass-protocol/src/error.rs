//! Error types for the protocol layer.
//!
//! Each crate in FastPass defines its own error enum. A `ProtocolError`
//! always means a payload could not be written or read, which is a bug
//! on one side of the proxy/backend pair, so callers get it back instead
//! of having it swallowed.

/// Errors that can occur while encoding or decoding channel messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer ended before a field could be read completely.
    #[error("truncated {field}: need {need} bytes, have {have}")]
    Truncated {
        /// Which field was being read.
        field: &'static str,
        /// Bytes required to finish the field.
        need: usize,
        /// Bytes left in the buffer.
        have: usize,
    },

    /// A string does not fit the `u16` length prefix.
    #[error("string of {len} bytes exceeds maximum of {max}")]
    StringTooLong { len: usize, max: usize },

    /// A string field held bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A boolean field held something other than `0` or `1`.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A complete message was read but bytes were left over.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// A message was addressed to our namespace under a name we don't know.
    #[error("unknown channel {0}")]
    UnknownChannel(String),

    /// A namespace was empty or contained the separator.
    #[error("invalid channel namespace {0:?}")]
    InvalidNamespace(String),

    /// A message was about to be sent on a channel that was never registered.
    #[error("channel {0} was not registered")]
    UnregisteredChannel(String),
}
