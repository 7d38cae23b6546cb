//! # Secondary Index Boundary
//!
//! Columns mirror their raw slot bytes into an ordered key -> row address
//! store. The store itself (a paged B+tree in production) lives outside this
//! crate; this module defines the contract a column relies on and ships one
//! in-process implementation.
//!
//! ## Contract
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `insert(txn, key, addr, allow_duplicate)` | Adds `(key, addr)`. With `allow_duplicate == false` an existing key is an error |
//! | `remove(txn, key, addr)` | Removes exactly the `(key, addr)` pair, returns whether it existed |
//! | `lookup(key)` | First address stored under `key` |
//! | `contains(key, addr)` | Whether the exact pair exists |
//! | `comparator()` | Renders keys for error messages |
//!
//! Implementations synchronize internally. Every method takes `&self`, and a
//! column calls them without holding any lock of its own.
//!
//! ## Ownership
//!
//! The catalog owns each index (`Arc<dyn RowIndex>`). Columns only keep a
//! `Weak` back-reference, so closing a table never keeps an index alive and a
//! released index is detected instead of dereferenced.
//!
//! ## MemoryIndex
//!
//! ```text
//! RwLock<BTreeMap<key bytes, SmallVec<[RowAddress; 1]>>>
//! ```
//!
//! Unique keys are the common case, so the address list stays inline for a
//! single entry. Addresses under one key are kept in insertion order.

use std::collections::BTreeMap;

use eyre::{bail, Result};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::encoding::hex;
use crate::types::{RowAddress, TxnId};

/// Renders index keys for diagnostics. Ordering belongs to the index
/// implementation itself.
pub trait KeyComparator: Send + Sync {
    fn describe(&self, key: &[u8]) -> String;
}

/// Hex rendering for keys stored as raw slot bytes, the format
/// [`MemoryIndex`] orders with plain `memcmp`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytewiseComparator;

impl KeyComparator for BytewiseComparator {
    fn describe(&self, key: &[u8]) -> String {
        format!("[{}]", hex::encode(key))
    }
}

pub trait RowIndex: Send + Sync {
    fn insert(&self, txn: TxnId, key: &[u8], addr: RowAddress, allow_duplicate: bool)
        -> Result<()>;

    fn remove(&self, txn: TxnId, key: &[u8], addr: RowAddress) -> Result<bool>;

    fn lookup(&self, key: &[u8]) -> Result<Option<RowAddress>>;

    fn contains(&self, key: &[u8], addr: RowAddress) -> Result<bool> {
        Ok(self.lookup(key)? == Some(addr))
    }

    fn comparator(&self) -> &dyn KeyComparator;
}

type Addresses = SmallVec<[RowAddress; 1]>;

#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: RwLock<BTreeMap<Vec<u8>, Addresses>>,
    comparator: BytewiseComparator,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of (key, address) pairs.
    pub fn len(&self) -> usize {
        self.entries.read().values().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.entries.read().len()
    }

    /// All entries in key order.
    pub fn entries(&self) -> Vec<(Vec<u8>, RowAddress)> {
        self.entries
            .read()
            .iter()
            .flat_map(|(key, addrs)| addrs.iter().map(move |addr| (key.clone(), *addr)))
            .collect()
    }
}

impl RowIndex for MemoryIndex {
    fn insert(
        &self,
        _txn: TxnId,
        key: &[u8],
        addr: RowAddress,
        allow_duplicate: bool,
    ) -> Result<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(addrs) => {
                if !allow_duplicate {
                    bail!(
                        "duplicate key {} in unique index (held by {}, inserting {})",
                        self.comparator.describe(key),
                        addrs[0],
                        addr
                    );
                }
                if !addrs.contains(&addr) {
                    addrs.push(addr);
                }
            }
            None => {
                let mut addrs = Addresses::new();
                addrs.push(addr);
                entries.insert(key.to_vec(), addrs);
            }
        }
        Ok(())
    }

    fn remove(&self, _txn: TxnId, key: &[u8], addr: RowAddress) -> Result<bool> {
        let mut entries = self.entries.write();
        let Some(addrs) = entries.get_mut(key) else {
            return Ok(false);
        };
        let Some(pos) = addrs.iter().position(|a| *a == addr) else {
            return Ok(false);
        };
        addrs.remove(pos);
        if addrs.is_empty() {
            entries.remove(key);
        }
        Ok(true)
    }

    fn lookup(&self, key: &[u8]) -> Result<Option<RowAddress>> {
        Ok(self
            .entries
            .read()
            .get(key)
            .and_then(|addrs| addrs.first().copied()))
    }

    fn contains(&self, key: &[u8], addr: RowAddress) -> Result<bool> {
        Ok(self
            .entries
            .read()
            .get(key)
            .is_some_and(|addrs| addrs.contains(&addr)))
    }

    fn comparator(&self) -> &dyn KeyComparator {
        &self.comparator
    }
}
