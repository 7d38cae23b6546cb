//! # Length-Prefixed Codecs
//!
//! VARCHAR, VARBINARY, BINARY and BLOB occupy `capacity + 1` bytes in the row:
//!
//! ```text
//! +------+---------------------+----------------------+
//! | len  | payload (len bytes) | zero fill            |
//! | u8   |                     | (capacity - len)     |
//! +------+---------------------+----------------------+
//! ```
//!
//! The zero fill is rewritten on every store, so the slot bytes are a pure
//! function of the value. Byte equality and index keys depend on this.
//!
//! ## Oversized Input
//!
//! | Policy | Outcome |
//! |--------|---------|
//! | `Reject` | `ColumnError::Overflow`, slot untouched |
//! | `Truncate` | First `capacity` bytes kept (VARCHAR: whole characters only) |
//!
//! BINARY additionally pads shorter input with zero bytes up to the capacity,
//! so its stored length is always the declared length.

use eyre::Result;
use tracing::debug;

use super::codec::{malformed, unsupported, ColumnCodec};
use super::Column;
use crate::config::LENGTH_PREFIX_SIZE;
use crate::encoding::{hex, text};
use crate::error::ColumnError;
use crate::interface::ResultSink;

/// Payload bytes of a present value.
pub(crate) fn payload<'a>(col: &Column, buf: &'a [u8], pos: usize) -> Result<&'a [u8]> {
    let len = buf[pos] as usize;
    if len > col.capacity() {
        return Err(malformed(
            col,
            &len.to_string(),
            format!("length prefix exceeds capacity {}", col.capacity()),
        ));
    }
    let start = pos + LENGTH_PREFIX_SIZE;
    Ok(&buf[start..start + len])
}

fn overflow(col: &Column, required: usize) -> eyre::Report {
    ColumnError::Overflow {
        column: col.name().to_string(),
        capacity: col.capacity(),
        required,
    }
    .into()
}

/// Writes the prefix and clears the tail after `len` payload bytes.
fn seal(col: &Column, buf: &mut [u8], pos: usize, len: usize) {
    let start = pos + LENGTH_PREFIX_SIZE;
    buf[pos] = len as u8;
    buf[start + len..start + col.capacity()].fill(0);
}

fn store_bytes(col: &Column, buf: &mut [u8], pos: usize, value: &[u8], pad: bool) -> Result<()> {
    let capacity = col.capacity();
    let kept = if value.len() > capacity {
        if !col.options().truncates() {
            return Err(overflow(col, value.len()));
        }
        debug!(
            column = col.name(),
            capacity,
            required = value.len(),
            "truncating binary value"
        );
        &value[..capacity]
    } else {
        value
    };

    let start = pos + LENGTH_PREFIX_SIZE;
    buf[start..start + kept.len()].copy_from_slice(kept);
    seal(col, buf, pos, kept.len());
    if pad {
        buf[pos] = capacity as u8;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarcharCodec;

impl ColumnCodec for VarcharCodec {
    fn get_string(&self, col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        let bytes = payload(col, buf, pos)?;
        text::decode(bytes).map_err(|e| malformed(col, &hex::encode(bytes), e))
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let capacity = col.capacity();
        let required = text::encoded_len(value);
        if required > capacity && !col.options().truncates() {
            return Err(overflow(col, required));
        }

        let start = pos + LENGTH_PREFIX_SIZE;
        let encoded = text::encode_into(value, &mut buf[start..start + capacity]);
        if encoded.truncated() {
            debug!(
                column = col.name(),
                capacity,
                required = encoded.required,
                kept = encoded.len,
                "truncating text value"
            );
        }
        seal(col, buf, pos, encoded.len);
        Ok(())
    }

    fn write_to(
        &self,
        col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_string(&self.get_string(col, buf, pos)?)
    }

    fn get_bytes(&self, col: &Column, buf: &[u8], pos: usize) -> Result<Vec<u8>> {
        Ok(payload(col, buf, pos)?.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytesCodec {
    pad: bool,
}

impl BytesCodec {
    /// VARBINARY and BLOB: stored length is the input length.
    pub fn variable() -> Self {
        Self { pad: false }
    }

    /// BINARY: input is zero-padded to the declared length.
    pub fn padded() -> Self {
        Self { pad: true }
    }
}

impl ColumnCodec for BytesCodec {
    fn get_string(&self, col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(hex::encode(payload(col, buf, pos)?))
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let bytes = hex::decode(value.trim()).map_err(|e| malformed(col, value, e))?;
        self.set_bytes(col, buf, pos, &bytes)
    }

    fn write_to(
        &self,
        col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_bytes(payload(col, buf, pos)?)
    }

    fn get_integer(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<i32> {
        Err(unsupported(col, "get_integer"))
    }

    fn set_integer(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: i32) -> Result<()> {
        Err(unsupported(col, "set_integer"))
    }

    fn get_long(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<i64> {
        Err(unsupported(col, "get_long"))
    }

    fn set_long(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: i64) -> Result<()> {
        Err(unsupported(col, "set_long"))
    }

    fn get_double(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<f64> {
        Err(unsupported(col, "get_double"))
    }

    fn set_double(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: f64) -> Result<()> {
        Err(unsupported(col, "set_double"))
    }

    fn get_boolean(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<bool> {
        Err(unsupported(col, "get_boolean"))
    }

    fn set_boolean(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: bool) -> Result<()> {
        Err(unsupported(col, "set_boolean"))
    }

    fn get_bytes(&self, col: &Column, buf: &[u8], pos: usize) -> Result<Vec<u8>> {
        Ok(payload(col, buf, pos)?.to_vec())
    }

    fn set_bytes(&self, col: &Column, buf: &mut [u8], pos: usize, value: &[u8]) -> Result<()> {
        store_bytes(col, buf, pos, value, self.pad)
    }
}
