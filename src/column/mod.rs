//! # Columns
//!
//! A [`Column`] binds one typed codec to a fixed byte range of a row. It is
//! produced by `RowLayoutBuilder` from a [`ColumnDef`] and is immutable
//! afterwards, apart from the deferred index attachment.
//!
//! ## Row Format
//!
//! ```text
//! row_offset
//! |
//! v
//! +-----------+-----------+-----+-----------+------------------+
//! | column 0  | column 1  | ... | column n  | null bitmap      |
//! | length 0  | length 1  |     | length n  | ceil(n/8) bytes  |
//! +-----------+-----------+-----+-----------+------------------+
//! ^offset 0   ^offset 1                     ^data_size
//! ```
//!
//! - `offset(Ci)` is the sum of the lengths of the columns declared before it.
//! - Column `i` owns bit `i % 8` of bitmap byte `i / 8`. A set bit means the
//!   value is present, so a zeroed row reads as all-null.
//! - Payload bytes of a null column are never read. Every accessor returns
//!   the zero value of its type (`0`, `0.0`, `false`, `""`, empty bytes, the
//!   Unix epoch) when the bit is clear.
//!
//! ## Operation Summary
//!
//! | Group | Operations |
//! |-------|------------|
//! | Null bitmap | `is_null`, `set_null`, `set_non_null` |
//! | Typed access | `get_*` / `set_*` for string, integer, long, double, boolean, bytes, date |
//! | Raw access | `raw_bytes`, `is_equal`, `is_equal_bytes`, `is_equal_str`, `eval_to_buffer` |
//! | Streaming | `eval_to_result` |
//! | Assignment | `set` (expression into cursor row) |
//! | Index mirror | `attach_index`, `set_index`, `delete_index`, `validate_index`, `close` |
//!
//! Every operation receives the buffer and the row offset explicitly. A
//! column holds no row state and takes no locks.
//!
//! ## Write Ordering
//!
//! A typed `set_*` writes the payload first and sets the null bit last, so a
//! failed write leaves a previously null slot null. Mirroring into the index
//! is a separate call: the caller brackets `set_*` + `set_index` (or
//! `delete_index` + `set_null`) in its own transaction.

mod codec;
mod def;
mod fixed;
mod index;
mod varlen;

#[cfg(test)]
mod tests;

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use eyre::{ensure, Result};
use tracing::trace;

pub use codec::{Codec, ColumnCodec};
pub use def::ColumnDef;
pub use fixed::{BooleanCodec, DateCodec, DoubleCodec, IntegerCodec, NumericCodec};
pub use varlen::{BytesCodec, VarcharCodec};

use crate::config::{CodecOptions, NO_AUTO_INCREMENT};
use crate::error::ColumnError;
use crate::index::RowIndex;
use crate::interface::{Expression, ResultSink, RowCursor};
use crate::types::ColumnType;

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    table: Arc<str>,
    ty: ColumnType,
    offset: usize,
    length: usize,
    capacity: usize,
    null_bit_offset: usize,
    null_mask: u8,
    precision: u8,
    scale: u8,
    primary_key: bool,
    unique: bool,
    not_null: bool,
    auto_increment_seed: i64,
    default_expression: Option<String>,
    options: CodecOptions,
    codec: Codec,
    index: Option<Weak<dyn RowIndex>>,
}

impl Column {
    pub(crate) fn from_def(
        def: ColumnDef,
        table: Arc<str>,
        offset: usize,
        null_bit_offset: usize,
        null_mask: u8,
        options: CodecOptions,
    ) -> Self {
        let length = def.slot_length();
        let capacity = def.payload_capacity();
        Self {
            codec: Codec::for_type(def.ty, def.precision, def.scale),
            name: def.name,
            table,
            ty: def.ty,
            offset,
            length,
            capacity,
            null_bit_offset,
            null_mask,
            precision: def.precision,
            scale: def.scale,
            primary_key: def.primary_key,
            unique: def.unique,
            not_null: def.not_null,
            auto_increment_seed: def.auto_increment_seed.unwrap_or(NO_AUTO_INCREMENT),
            default_expression: def.default_expression,
            options,
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn column_type(&self) -> ColumnType {
        self.ty
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes the column occupies in the row, including a length prefix.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Largest payload a value can have. Equals `length` for fixed types.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn null_bit_offset(&self) -> usize {
        self.null_bit_offset
    }

    pub fn null_mask(&self) -> u8 {
        self.null_mask
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn auto_increment_seed(&self) -> Option<i64> {
        (self.auto_increment_seed != NO_AUTO_INCREMENT).then_some(self.auto_increment_seed)
    }

    pub fn default_expression(&self) -> Option<&str> {
        self.default_expression.as_deref()
    }

    #[inline]
    fn pos(&self, row: usize) -> usize {
        row + self.offset
    }

    #[inline]
    fn ops(&self) -> &dyn ColumnCodec {
        self.codec.as_dyn()
    }

    #[inline]
    pub fn is_null(&self, buf: &[u8], row: usize) -> bool {
        buf[row + self.null_bit_offset] & self.null_mask == 0
    }

    #[inline]
    pub fn set_null(&self, buf: &mut [u8], row: usize) {
        buf[row + self.null_bit_offset] &= !self.null_mask;
    }

    #[inline]
    pub fn set_non_null(&self, buf: &mut [u8], row: usize) {
        buf[row + self.null_bit_offset] |= self.null_mask;
    }

    pub fn get_string(&self, buf: &[u8], row: usize) -> Result<String> {
        if self.is_null(buf, row) {
            return Ok(String::new());
        }
        self.ops().get_string(self, buf, self.pos(row))
    }

    pub fn set_string(&self, buf: &mut [u8], row: usize, value: &str) -> Result<()> {
        self.ops().set_string(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_integer(&self, buf: &[u8], row: usize) -> Result<i32> {
        if self.is_null(buf, row) {
            return Ok(0);
        }
        self.ops().get_integer(self, buf, self.pos(row))
    }

    pub fn set_integer(&self, buf: &mut [u8], row: usize, value: i32) -> Result<()> {
        self.ops().set_integer(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_long(&self, buf: &[u8], row: usize) -> Result<i64> {
        if self.is_null(buf, row) {
            return Ok(0);
        }
        self.ops().get_long(self, buf, self.pos(row))
    }

    pub fn set_long(&self, buf: &mut [u8], row: usize, value: i64) -> Result<()> {
        self.ops().set_long(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_double(&self, buf: &[u8], row: usize) -> Result<f64> {
        if self.is_null(buf, row) {
            return Ok(0.0);
        }
        self.ops().get_double(self, buf, self.pos(row))
    }

    pub fn set_double(&self, buf: &mut [u8], row: usize, value: f64) -> Result<()> {
        self.ops().set_double(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_boolean(&self, buf: &[u8], row: usize) -> Result<bool> {
        if self.is_null(buf, row) {
            return Ok(false);
        }
        self.ops().get_boolean(self, buf, self.pos(row))
    }

    pub fn set_boolean(&self, buf: &mut [u8], row: usize, value: bool) -> Result<()> {
        self.ops().set_boolean(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_bytes(&self, buf: &[u8], row: usize) -> Result<Vec<u8>> {
        if self.is_null(buf, row) {
            return Ok(Vec::new());
        }
        self.ops().get_bytes(self, buf, self.pos(row))
    }

    pub fn set_bytes(&self, buf: &mut [u8], row: usize, value: &[u8]) -> Result<()> {
        self.ops().set_bytes(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    pub fn get_date(&self, buf: &[u8], row: usize) -> Result<DateTime<Utc>> {
        if self.is_null(buf, row) {
            return Ok(DateTime::<Utc>::default());
        }
        self.ops().get_date(self, buf, self.pos(row))
    }

    pub fn set_date(&self, buf: &mut [u8], row: usize, value: DateTime<Utc>) -> Result<()> {
        self.ops().set_date(self, buf, self.pos(row), value)?;
        self.set_non_null(buf, row);
        Ok(())
    }

    /// The slot bytes `[offset, offset + length)`, regardless of the null bit.
    #[inline]
    pub fn raw_bytes<'a>(&self, buf: &'a [u8], row: usize) -> &'a [u8] {
        let pos = self.pos(row);
        &buf[pos..pos + self.length]
    }

    /// Null-aware equality. Two nulls are equal; a null never equals a value.
    pub fn is_equal(&self, buf_a: &[u8], row_a: usize, buf_b: &[u8], row_b: usize) -> bool {
        match (self.is_null(buf_a, row_a), self.is_null(buf_b, row_b)) {
            (true, true) => true,
            (false, false) => self.raw_bytes(buf_a, row_a) == self.raw_bytes(buf_b, row_b),
            _ => false,
        }
    }

    /// Compares the slot against raw slot bytes, such as an index key.
    pub fn is_equal_bytes(&self, buf: &[u8], row: usize, other: &[u8]) -> bool {
        !self.is_null(buf, row) && self.raw_bytes(buf, row) == other
    }

    pub fn is_equal_str(&self, buf: &[u8], row: usize, other: &str) -> Result<bool> {
        if self.is_null(buf, row) {
            return Ok(false);
        }
        Ok(self.get_string(buf, row)? == other)
    }

    /// Copies the slot bytes to `out[out_offset..]`. Returns the number of
    /// bytes written, 0 for null.
    pub fn eval_to_buffer(
        &self,
        buf: &[u8],
        row: usize,
        out: &mut [u8],
        out_offset: usize,
    ) -> Result<usize> {
        if self.is_null(buf, row) {
            return Ok(0);
        }
        ensure!(
            out.len() >= out_offset + self.length,
            "output buffer too small for column '{}': need {} bytes at {}, have {}",
            self.name,
            self.length,
            out_offset,
            out.len()
        );
        out[out_offset..out_offset + self.length].copy_from_slice(self.raw_bytes(buf, row));
        Ok(self.length)
    }

    pub fn eval_to_result(
        &self,
        block_id: u32,
        buf: &[u8],
        row: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        let null = self.is_null(buf, row);
        trace!(column = %self.name, block_id, row, null, "streaming column value");
        if null {
            return sink.write_null();
        }
        self.ops().write_to(self, buf, self.pos(row), sink)
    }

    /// Evaluates `expr` and stores the result in the cursor's current row.
    ///
    /// The evaluation method follows the column type: text for BOOLEAN,
    /// VARCHAR and NUMERIC, integers for the integral types and DATE (epoch
    /// milliseconds), doubles for DOUBLE, bytes for the binary types.
    pub fn set<E>(&self, cursor: &mut dyn RowCursor, expr: &E, ctx: &E::Context) -> Result<()>
    where
        E: Expression + ?Sized,
    {
        let row = cursor.row_offset();
        trace!(column = %self.name, txn = %cursor.transaction(), row, "assigning column");

        if expr.is_null(ctx)? {
            if self.not_null {
                return Err(ColumnError::NullViolation {
                    table: self.table.to_string(),
                    column: self.name.clone(),
                }
                .into());
            }
            self.set_null(cursor.buffer_mut(), row);
            cursor.set_dirty();
            return Ok(());
        }

        match self.ty {
            ColumnType::Boolean | ColumnType::Varchar | ColumnType::Numeric => {
                let value = expr.eval_string(ctx)?;
                self.set_string(cursor.buffer_mut(), row, &value)?;
            }
            ColumnType::Byte
            | ColumnType::Short
            | ColumnType::Int
            | ColumnType::Long
            | ColumnType::Identity
            | ColumnType::Date => {
                let value = expr.eval_long(ctx)?;
                self.set_long(cursor.buffer_mut(), row, value)?;
            }
            ColumnType::Double => {
                let value = expr.eval_double(ctx)?;
                self.set_double(cursor.buffer_mut(), row, value)?;
            }
            ColumnType::Varbinary | ColumnType::Binary | ColumnType::Blob => {
                let value = expr.eval_bytes(ctx)?;
                self.set_bytes(cursor.buffer_mut(), row, &value)?;
            }
        }
        cursor.set_dirty();
        Ok(())
    }
}
