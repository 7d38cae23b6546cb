//! # Compact Text Encoding
//!
//! VARCHAR payloads are stored as a sequence of UTF-16 code units, each unit
//! packed into one to three bytes:
//!
//! | Unit range | Bytes | Pattern |
//! |------------|-------|---------|
//! | `0x0000..0x0080` | 1 | `0xxxxxxx` |
//! | `0x0080..0x0800` | 2 | `110xxxxx 10xxxxxx` |
//! | `0x0800..=0xFFFF` | 3 | `1110xxxx 10xxxxxx 10xxxxxx` |
//!
//! Characters of the Basic Multilingual Plane take one unit. Characters above
//! it are written as their surrogate pair, two 3-byte units, so the format
//! never needs a 4-byte sequence.
//!
//! ## Capacity-Bounded Encoding
//!
//! [`encode_into`] writes into a destination slice whose length is the column
//! capacity. When the next character does not fit, encoding stops and the
//! result reports `truncated`. Stopping happens on character boundaries, so a
//! surrogate pair is never split and the stored prefix always decodes.
//!
//! ```text
//! capacity 4, input "aé€"
//!   'a' -> 61          (1 byte,  total 1)
//!   'é' -> C3 A9       (2 bytes, total 3)
//!   '€' -> E2 82 AC    (3 bytes, total 6 > 4: stop)
//! stored: 61 C3 A9, truncated = true
//! ```

use eyre::{bail, Result};
use smallvec::SmallVec;

use crate::config::MAX_BYTES_PER_UNIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    /// Bytes written into the destination.
    pub len: usize,
    /// Bytes the full input would have needed.
    pub required: usize,
}

impl Encoded {
    pub fn truncated(&self) -> bool {
        self.len < self.required
    }
}

#[inline]
fn unit_len(unit: u16) -> usize {
    match unit {
        0x0000..=0x007F => 1,
        0x0080..=0x07FF => 2,
        _ => MAX_BYTES_PER_UNIT,
    }
}

#[inline]
fn char_len(c: char) -> usize {
    let mut units = [0u16; 2];
    c.encode_utf16(&mut units).iter().map(|&u| unit_len(u)).sum()
}

/// Number of bytes needed to store `text` without truncation.
pub fn encoded_len(text: &str) -> usize {
    text.chars().map(char_len).sum()
}

fn put_unit(dst: &mut [u8], pos: usize, unit: u16) -> usize {
    match unit_len(unit) {
        1 => {
            dst[pos] = unit as u8;
            1
        }
        2 => {
            dst[pos] = 0xC0 | (unit >> 6) as u8;
            dst[pos + 1] = 0x80 | (unit & 0x3F) as u8;
            2
        }
        _ => {
            dst[pos] = 0xE0 | (unit >> 12) as u8;
            dst[pos + 1] = 0x80 | ((unit >> 6) & 0x3F) as u8;
            dst[pos + 2] = 0x80 | (unit & 0x3F) as u8;
            3
        }
    }
}

/// Encodes as many whole characters of `text` as fit into `dst`.
pub fn encode_into(text: &str, dst: &mut [u8]) -> Encoded {
    let required = encoded_len(text);
    let mut pos = 0;
    let mut units = [0u16; 2];

    for c in text.chars() {
        if pos + char_len(c) > dst.len() {
            break;
        }
        for &unit in c.encode_utf16(&mut units).iter() {
            pos += put_unit(dst, pos, unit);
        }
    }

    Encoded { len: pos, required }
}

#[inline]
fn continuation(src: &[u8], pos: usize) -> Result<u16> {
    match src.get(pos) {
        Some(&b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        Some(&b) => bail!("byte 0x{:02x} at {} is not a continuation byte", b, pos),
        None => bail!("sequence truncated at byte {}", pos),
    }
}

/// Decodes a payload produced by [`encode_into`].
pub fn decode(src: &[u8]) -> Result<String> {
    let mut units: SmallVec<[u16; 64]> = SmallVec::with_capacity(src.len());
    let mut pos = 0;

    while pos < src.len() {
        let lead = src[pos];
        let unit = if lead & 0x80 == 0 {
            pos += 1;
            lead as u16
        } else if lead & 0xE0 == 0xC0 {
            let unit = ((lead & 0x1F) as u16) << 6 | continuation(src, pos + 1)?;
            pos += 2;
            unit
        } else if lead & 0xF0 == 0xE0 {
            let unit = ((lead & 0x0F) as u16) << 12
                | continuation(src, pos + 1)? << 6
                | continuation(src, pos + 2)?;
            pos += 3;
            unit
        } else {
            bail!("invalid lead byte 0x{:02x} at {}", lead, pos);
        };
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|e| eyre::eyre!("unpaired surrogate in text: {}", e))
}
