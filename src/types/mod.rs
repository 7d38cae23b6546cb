//! # Type System
//!
//! - `column_type`: the closed set of storable [`ColumnType`]s
//! - `address`: [`RowAddress`] index values and the opaque [`TxnId`]

mod address;
mod column_type;

pub use address::{RowAddress, TxnId};
pub use column_type::ColumnType;
