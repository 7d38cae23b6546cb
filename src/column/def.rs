//! # Column Definitions
//!
//! A `ColumnDef` is the mutable, pre-layout description of a column. It is
//! consumed by `RowLayoutBuilder`, which validates it, assigns its offset and
//! null bit, and freezes it into a [`Column`](super::Column).
//!
//! ```ignore
//! let id = ColumnDef::new("id", ColumnType::Long).primary_key();
//! let name = ColumnDef::varchar("name", 64).not_null();
//! let price = ColumnDef::numeric("price", 10, 2).with_default("0.00");
//! let seq = ColumnDef::identity("seq");
//! ```

use eyre::{bail, ensure, Result};

use crate::config::{
    DEFAULT_BLOB_CAPACITY, DEFAULT_IDENTITY_SEED, LENGTH_PREFIX_SIZE, MAX_NUMERIC_PRECISION,
    MAX_VARLEN_CAPACITY,
};
use crate::types::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub(crate) name: String,
    pub(crate) ty: ColumnType,
    pub(crate) capacity: Option<usize>,
    pub(crate) precision: u8,
    pub(crate) scale: u8,
    pub(crate) primary_key: bool,
    pub(crate) unique: bool,
    pub(crate) not_null: bool,
    pub(crate) auto_increment_seed: Option<i64>,
    pub(crate) default_expression: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        let mut def = Self {
            name: name.into(),
            ty,
            capacity: None,
            precision: MAX_NUMERIC_PRECISION,
            scale: 0,
            primary_key: false,
            unique: false,
            not_null: false,
            auto_increment_seed: None,
            default_expression: None,
        };
        match ty {
            ColumnType::Blob => def.capacity = Some(DEFAULT_BLOB_CAPACITY),
            ColumnType::Identity => def.auto_increment_seed = Some(DEFAULT_IDENTITY_SEED),
            _ => {}
        }
        def
    }

    /// VARCHAR holding up to `capacity` encoded bytes.
    pub fn varchar(name: impl Into<String>, capacity: usize) -> Self {
        Self::new(name, ColumnType::Varchar).with_capacity(capacity)
    }

    pub fn varbinary(name: impl Into<String>, capacity: usize) -> Self {
        Self::new(name, ColumnType::Varbinary).with_capacity(capacity)
    }

    pub fn binary(name: impl Into<String>, length: usize) -> Self {
        Self::new(name, ColumnType::Binary).with_capacity(length)
    }

    pub fn blob(name: impl Into<String>, capacity: usize) -> Self {
        Self::new(name, ColumnType::Blob).with_capacity(capacity)
    }

    pub fn numeric(name: impl Into<String>, precision: u8, scale: u8) -> Self {
        let mut def = Self::new(name, ColumnType::Numeric);
        def.precision = precision;
        def.scale = scale;
        def
    }

    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Identity)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Primary keys are unique and NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self, seed: i64) -> Self {
        self.auto_increment_seed = Some(seed);
        self
    }

    /// Stores an unevaluated default expression for the expression engine.
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.ty
    }

    /// Payload bytes available to a value of this column.
    pub(crate) fn payload_capacity(&self) -> usize {
        self.ty
            .fixed_width()
            .unwrap_or_else(|| self.capacity.unwrap_or(0))
    }

    /// Bytes the column occupies in the row.
    pub(crate) fn slot_length(&self) -> usize {
        match self.ty.fixed_width() {
            Some(width) => width,
            None => self.payload_capacity() + LENGTH_PREFIX_SIZE,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(!self.name.is_empty(), "column name cannot be empty");

        if self.ty.is_variable() {
            let Some(capacity) = self.capacity else {
                bail!(
                    "{} column '{}' requires a declared length",
                    self.ty,
                    self.name
                );
            };
            ensure!(
                (1..=MAX_VARLEN_CAPACITY).contains(&capacity),
                "{} column '{}' length {} must be between 1 and {}",
                self.ty,
                self.name,
                capacity,
                MAX_VARLEN_CAPACITY
            );
        }

        if self.ty == ColumnType::Numeric {
            ensure!(
                (1..=MAX_NUMERIC_PRECISION).contains(&self.precision),
                "NUMERIC column '{}' precision {} must be between 1 and {}",
                self.name,
                self.precision,
                MAX_NUMERIC_PRECISION
            );
            ensure!(
                self.scale <= self.precision,
                "NUMERIC column '{}' scale {} exceeds precision {}",
                self.name,
                self.scale,
                self.precision
            );
        }

        if let Some(seed) = self.auto_increment_seed {
            ensure!(
                self.ty.is_integral(),
                "auto-increment requires an integral column, '{}' is {}",
                self.name,
                self.ty
            );
            ensure!(
                seed >= 0,
                "auto-increment seed of column '{}' must be >= 0, got {}",
                self.name,
                seed
            );
        }

        Ok(())
    }
}
