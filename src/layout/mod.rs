//! # Row Layout
//!
//! `RowLayout` is the frozen column set of one table. It is built in a single
//! pass by [`RowLayoutBuilder`], which:
//!
//! 1. validates every [`ColumnDef`] and rejects duplicate names
//! 2. assigns offsets in declaration order, each the running sum of lengths
//! 3. places the null bitmap directly after the data section
//! 4. gives column `i` bit `1 << (i % 8)` of bitmap byte `i / 8`
//!
//! ## Example
//!
//! ```text
//! builder("orders")
//!   .column(id      LONG)          offset 0   length 8
//!   .column(qty     SHORT)         offset 8   length 2
//!   .column(note    VARCHAR(10))   offset 10  length 11
//!
//! data_size = 21, null_bitmap_size = 1, row_size = 22
//! bitmap byte 21: bit0 = id, bit1 = qty, bit2 = note
//! ```
//!
//! After `build` the layout only changes through `columns_mut` /
//! `attach_index`, the deferred index attachment, and `close`, which releases
//! every index handle when the owning table closes.

use std::sync::Arc;

use eyre::{bail, ensure, eyre, Result};
use hashbrown::HashMap;
use tracing::debug;

use crate::column::{Column, ColumnDef};
use crate::config::{CodecOptions, NULL_BITS_PER_BYTE};
use crate::index::RowIndex;

#[derive(Debug, Clone)]
pub struct RowLayout {
    table: Arc<str>,
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    data_size: usize,
    null_bitmap_size: usize,
    options: CodecOptions,
}

#[derive(Debug, Clone)]
pub struct RowLayoutBuilder {
    table: String,
    options: CodecOptions,
    defs: Vec<ColumnDef>,
}

impl RowLayoutBuilder {
    pub fn options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn column(mut self, def: ColumnDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn columns(mut self, defs: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.defs.extend(defs);
        self
    }

    pub fn build(self) -> Result<RowLayout> {
        ensure!(!self.table.is_empty(), "table name cannot be empty");
        ensure!(
            !self.defs.is_empty(),
            "table '{}' must declare at least one column",
            self.table
        );

        let mut by_name = HashMap::with_capacity(self.defs.len());
        for (idx, def) in self.defs.iter().enumerate() {
            def.validate()
                .map_err(|e| e.wrap_err(format!("invalid column in table '{}'", self.table)))?;
            if by_name.insert(def.name().to_string(), idx).is_some() {
                bail!(
                    "duplicate column '{}' in table '{}'",
                    def.name(),
                    self.table
                );
            }
        }

        let data_size: usize = self.defs.iter().map(ColumnDef::slot_length).sum();
        let null_bitmap_size = self.defs.len().div_ceil(NULL_BITS_PER_BYTE);
        let table: Arc<str> = Arc::from(self.table.as_str());

        let mut offset = 0;
        let mut columns = Vec::with_capacity(self.defs.len());
        for (idx, def) in self.defs.into_iter().enumerate() {
            let length = def.slot_length();
            columns.push(Column::from_def(
                def,
                Arc::clone(&table),
                offset,
                data_size + idx / NULL_BITS_PER_BYTE,
                1 << (idx % NULL_BITS_PER_BYTE),
                self.options,
            ));
            offset += length;
        }

        debug!(
            table = %table,
            columns = columns.len(),
            data_size,
            row_size = data_size + null_bitmap_size,
            "built row layout"
        );

        Ok(RowLayout {
            table,
            columns,
            by_name,
            data_size,
            null_bitmap_size,
            options: self.options,
        })
    }
}

impl RowLayout {
    pub fn builder(table: impl Into<String>) -> RowLayoutBuilder {
        RowLayoutBuilder {
            table: table.into(),
            options: CodecOptions::default(),
            defs: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|idx| &self.columns[idx])
    }

    pub fn column_mut_by_name(&mut self, name: &str) -> Option<&mut Column> {
        let idx = self.index_of(name)?;
        self.columns.get_mut(idx)
    }

    /// Bytes used by column slots, excluding the null bitmap.
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn null_bitmap_size(&self) -> usize {
        self.null_bitmap_size
    }

    pub fn row_size(&self) -> usize {
        self.data_size + self.null_bitmap_size
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// A zeroed row. Every column reads as null.
    pub fn new_row(&self) -> Vec<u8> {
        vec![0u8; self.row_size()]
    }

    pub fn attach_index(&mut self, column: &str, index: &Arc<dyn RowIndex>) -> Result<()> {
        let table = Arc::clone(&self.table);
        self.column_mut_by_name(column)
            .ok_or_else(|| eyre!("column '{}' not found in table '{}'", column, table))?
            .attach_index(index)
    }

    /// Releases every index handle held by the columns.
    pub fn close(&mut self) {
        for column in &mut self.columns {
            column.close();
        }
    }
}
