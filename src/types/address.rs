//! # Row Addresses and Transaction Handles
//!
//! A [`RowAddress`] is the value stored in every index entry. It packs the
//! block id into the high 32 bits and the in-block byte offset into the low
//! 32 bits:
//!
//! ```text
//! 63                    32 31                     0
//! +-----------------------+-----------------------+
//! |       block id        |   offset in block     |
//! +-----------------------+-----------------------+
//! ```
//!
//! [`TxnId`] is the opaque transaction handle threaded through mutating
//! operations. The codec never interprets it; it is forwarded to the index.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowAddress(u64);

impl RowAddress {
    pub fn new(block_id: u32, offset: u32) -> Self {
        Self(((block_id as u64) << 32) | offset as u64)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn block_id(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn offset(&self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for RowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_id(), self.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxnId(pub u64);

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn#{}", self.0)
    }
}
