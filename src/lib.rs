//! # rowcodec - Fixed-Layout Row Codec
//!
//! rowcodec maps typed, named columns onto byte ranges of a caller-owned row
//! buffer. It is the record layer of an embedded table engine:
//!
//! - **Stable binary format**: big-endian fixed-width values, length-prefixed
//!   variable values, byte-for-byte reproducible on every platform
//! - **Out-of-band nulls**: one bit per column in a bitmap after the data
//! - **Index mirroring**: indexed columns copy their slot bytes into an
//!   external ordered index and can validate it against the row
//!
//! ## Quick Start
//!
//! ```ignore
//! use rowcodec::{ColumnDef, ColumnType, RowLayout};
//!
//! let layout = RowLayout::builder("users")
//!     .column(ColumnDef::new("id", ColumnType::Long).primary_key())
//!     .column(ColumnDef::varchar("name", 32))
//!     .build()?;
//!
//! let mut row = layout.new_row();
//! let id = layout.column_by_name("id").unwrap();
//! id.set_long(&mut row, 0, 42)?;
//! assert_eq!(id.get_long(&row, 0)?, 42);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   Table layer (external: cursors, txns)  │
//! ├──────────────────────────────────────────┤
//! │  RowLayout        │  Constraint hooks    │
//! ├───────────────────┴──────────────────────┤
//! │  Column  (null bit, offset, index handle)│
//! ├──────────────────────────────────────────┤
//! │  Codec   (one per ColumnType)            │
//! ├──────────────────────────────────────────┤
//! │  encoding (big-endian, text, hex)        │
//! └──────────────────────────────────────────┘
//!            │ mirrors keys into
//!            v
//!   RowIndex (external ordered index)
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: format constants and [`CodecOptions`]
//! - [`error`]: the [`ColumnError`] taxonomy
//! - [`types`]: [`ColumnType`], [`RowAddress`], [`TxnId`]
//! - [`encoding`]: byte-level codecs
//! - [`column`]: column definitions, descriptors and per-type codecs
//! - [`layout`]: offset and null-bit assignment
//! - [`index`]: the index boundary and an in-memory index
//! - [`interface`]: expression, result sink and cursor traits
//! - [`constraints`]: commit-time constraint hooks
//!
//! ## Concurrency
//!
//! Nothing here locks. Callers pass an already-locked row buffer; the only
//! shared state a column touches is its index, which synchronizes itself.

pub mod column;
pub mod config;
pub mod constraints;
pub mod encoding;
pub mod error;
pub mod index;
pub mod interface;
pub mod layout;
pub mod types;

pub use column::{Column, ColumnDef};
pub use config::{CodecOptions, OverflowPolicy};
pub use constraints::{Constraint, NotNullConstraint};
pub use error::ColumnError;
pub use index::{MemoryIndex, RowIndex};
pub use interface::{CollectingSink, Expression, Literal, ResultSink, RowCursor, RowSlot};
pub use layout::{RowLayout, RowLayoutBuilder};
pub use types::{ColumnType, RowAddress, TxnId};
