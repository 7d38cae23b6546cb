//! # Index Mirroring
//!
//! An indexed column mirrors its slot bytes into a [`RowIndex`]:
//!
//! ```text
//! key   = raw_bytes(row)       // [offset, offset + length), prefix and fill included
//! value = RowAddress           // block id + in-block offset of the row
//! ```
//!
//! One path serves every column type. The key width is the column length, so
//! a SHORT column inserts 2-byte keys through the same code as a LONG column
//! inserting 8-byte keys.
//!
//! | Operation | No index attached | Null value | Otherwise |
//! |-----------|-------------------|------------|-----------|
//! | `set_index` | no-op | no-op | `insert(key, addr)` |
//! | `delete_index` | `Ok(false)` | `Ok(false)` | `remove(key, addr)` |
//! | `validate_index` | no-op | no-op | `contains(key, addr)` or fatal `IndexCorruption` |
//!
//! Unique and primary-key columns insert with `allow_duplicate == false`.
//!
//! The column keeps only a `Weak` handle. Once the owner drops the index
//! every operation fails with `IndexDetached` until `close` clears the handle.

use std::sync::Arc;

use eyre::{bail, Result};
use tracing::{debug, error, trace};

use super::Column;
use crate::error::ColumnError;
use crate::index::RowIndex;
use crate::types::{RowAddress, TxnId};

impl Column {
    /// Attaches a secondary index after the layout was built. A column
    /// mirrors into at most one index.
    pub fn attach_index(&mut self, index: &Arc<dyn RowIndex>) -> Result<()> {
        if self.index.is_some() {
            bail!(
                "column '{}' of table '{}' already has an index attached",
                self.name,
                self.table
            );
        }
        debug!(table = %self.table, column = %self.name, "attaching index");
        self.index = Some(Arc::downgrade(index));
        Ok(())
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    fn index_handle(&self) -> Result<Option<Arc<dyn RowIndex>>> {
        let Some(weak) = &self.index else {
            return Ok(None);
        };
        match weak.upgrade() {
            Some(index) => Ok(Some(index)),
            None => Err(ColumnError::IndexDetached {
                column: self.name.clone(),
            }
            .into()),
        }
    }

    fn allows_duplicates(&self) -> bool {
        !(self.unique || self.primary_key)
    }

    pub fn set_index(&self, txn: TxnId, buf: &[u8], row: usize, addr: RowAddress) -> Result<()> {
        let Some(index) = self.index_handle()? else {
            return Ok(());
        };
        if self.is_null(buf, row) {
            return Ok(());
        }
        trace!(column = %self.name, %txn, %addr, "index insert");
        index.insert(txn, self.raw_bytes(buf, row), addr, self.allows_duplicates())
    }

    /// Removes this row's entry. Returns whether an entry was removed.
    pub fn delete_index(
        &self,
        txn: TxnId,
        buf: &[u8],
        row: usize,
        addr: RowAddress,
    ) -> Result<bool> {
        let Some(index) = self.index_handle()? else {
            return Ok(false);
        };
        if self.is_null(buf, row) {
            return Ok(false);
        }
        trace!(column = %self.name, %txn, %addr, "index remove");
        index.remove(txn, self.raw_bytes(buf, row), addr)
    }

    /// Checks that the index maps this row's value to `addr`.
    ///
    /// A mismatch means row bytes and index have diverged. The returned
    /// `IndexCorruption` is fatal and must reach the caller unchanged.
    pub fn validate_index(
        &self,
        txn: TxnId,
        buf: &[u8],
        row: usize,
        addr: RowAddress,
    ) -> Result<()> {
        let Some(index) = self.index_handle()? else {
            return Ok(());
        };
        if self.is_null(buf, row) {
            return Ok(());
        }

        let key = self.raw_bytes(buf, row);
        if index.contains(key, addr)? {
            return Ok(());
        }

        let found = match index.lookup(key)? {
            Some(other) => other.to_string(),
            None => "no entry".to_string(),
        };
        let key = index.comparator().describe(key);
        error!(
            table = %self.table,
            column = %self.name,
            %txn,
            key = %key,
            expected = %addr,
            found = %found,
            "index corruption detected"
        );
        Err(ColumnError::IndexCorruption {
            column: self.name.clone(),
            key,
            expected: addr,
            found,
        }
        .into())
    }

    /// Releases the index handle. The index itself stays with its owner.
    pub fn close(&mut self) {
        if self.index.take().is_some() {
            debug!(table = %self.table, column = %self.name, "released index handle");
        }
    }
}
