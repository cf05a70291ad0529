//! Primitive readers and writers for channel message payloads.
//!
//! The layout follows the JVM's `DataOutput` conventions: big-endian
//! integers, strings prefixed with an unsigned 16-bit byte length, booleans
//! as a single `0`/`1` byte. Strings are standard UTF-8, not the modified
//! UTF-8 of `writeUTF`. The two agree on text without NUL or characters
//! outside the Basic Multilingual Plane, which covers player names.
//!
//! Writers take any [`BufMut`] and readers any [`Buf`], so the same code
//! works on a `BytesMut`, a `Vec<u8>` or a plain `&[u8]`. The `bytes`
//! getters panic on underflow, which is why every reader checks
//! [`Buf::remaining`] first and turns a short buffer into
//! [`ProtocolError::Truncated`].

use bytes::{Buf, BufMut};
use uuid::Uuid;

use crate::ProtocolError;

/// Longest string (in UTF-8 bytes) a `u16` length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Longest optional byte blob, same limit as strings.
pub const MAX_BLOB_LEN: usize = u16::MAX as usize;

/// Writes a length-prefixed UTF-8 string.
///
/// # Errors
/// [`ProtocolError::StringTooLong`] if `value` is longer than
/// [`MAX_STRING_LEN`] bytes. Nothing is written in that case.
pub fn write_string(buf: &mut impl BufMut, value: &str) -> Result<(), ProtocolError> {
    let len = value.len();
    if len > MAX_STRING_LEN {
        return Err(ProtocolError::StringTooLong {
            len,
            max: MAX_STRING_LEN,
        });
    }
    buf.put_u16(len as u16);
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Reads a string written by [`write_string`].
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtocolError> {
    ensure(buf, "string length", 2)?;
    let len = buf.get_u16() as usize;
    ensure(buf, "string", len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(String::from_utf8(bytes)?)
}

pub fn write_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Reads a boolean byte. Only `0` and `1` are accepted.
pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtocolError> {
    ensure(buf, "bool", 1)?;
    match buf.get_u8() {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ProtocolError::InvalidBool(other)),
    }
}

/// Writes a UUID as its most and least significant 64-bit halves.
pub fn write_uuid(buf: &mut impl BufMut, value: &Uuid) {
    let (high, low) = value.as_u64_pair();
    buf.put_u64(high);
    buf.put_u64(low);
}

pub fn read_uuid(buf: &mut impl Buf) -> Result<Uuid, ProtocolError> {
    ensure(buf, "uuid", 16)?;
    let high = buf.get_u64();
    let low = buf.get_u64();
    Ok(Uuid::from_u64_pair(high, low))
}

/// Writes a presence flag followed, when present, by a length-prefixed blob.
pub fn write_optional_bytes(
    buf: &mut impl BufMut,
    value: Option<&[u8]>,
) -> Result<(), ProtocolError> {
    match value {
        None => write_bool(buf, false),
        Some(data) => {
            if data.len() > MAX_BLOB_LEN {
                return Err(ProtocolError::StringTooLong {
                    len: data.len(),
                    max: MAX_BLOB_LEN,
                });
            }
            write_bool(buf, true);
            buf.put_u16(data.len() as u16);
            buf.put_slice(data);
        }
    }
    Ok(())
}

pub fn read_optional_bytes(buf: &mut impl Buf) -> Result<Option<Vec<u8>>, ProtocolError> {
    if !read_bool(buf)? {
        return Ok(None);
    }
    ensure(buf, "blob length", 2)?;
    let len = buf.get_u16() as usize;
    ensure(buf, "blob", len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(Some(data))
}

fn ensure(buf: &impl Buf, field: &'static str, need: usize) -> Result<(), ProtocolError> {
    let have = buf.remaining();
    if have < need {
        return Err(ProtocolError::Truncated { field, need, have });
    }
    Ok(())
}
