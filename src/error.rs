//! # Column Error Taxonomy
//!
//! Codec operations return `eyre::Result`. Failures that a caller may want to
//! branch on are raised as a [`ColumnError`] inside the report, so they can be
//! recovered with `report.downcast_ref::<ColumnError>()`.
//!
//! | Variant | Cause | Caller reaction |
//! |---------|-------|-----------------|
//! | `Unsupported` | Accessor has no representation for this type | Planner/type defect, never retried |
//! | `Malformed` | String fallback could not parse, or stored bytes do not decode | Data error |
//! | `OutOfRange` | Value does not fit the column's wire width | Data error |
//! | `Overflow` | Variable-length input exceeds the declared capacity | Data error |
//! | `NullViolation` | NULL written into a NOT NULL column | Constraint error |
//! | `IndexDetached` | The owning catalog already released the index | Lifecycle defect |
//! | `IndexCorruption` | Index entry disagrees with the row | **Fatal** |
//!
//! `IndexCorruption` means the row bytes and the index have diverged. It must be
//! surfaced to the operator and never repaired in place.

use thiserror::Error;

use crate::types::{ColumnType, RowAddress};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    #[error("column '{column}' of type {ty} does not support {operation}")]
    Unsupported {
        column: String,
        ty: ColumnType,
        operation: &'static str,
    },

    #[error("malformed value {value:?} for column '{column}': {reason}")]
    Malformed {
        column: String,
        value: String,
        reason: String,
    },

    #[error("value {value} is out of range for column '{column}' of type {ty}")]
    OutOfRange {
        column: String,
        ty: ColumnType,
        value: String,
    },

    #[error("value needs {required} bytes but column '{column}' holds at most {capacity}")]
    Overflow {
        column: String,
        capacity: usize,
        required: usize,
    },

    #[error("NOT NULL constraint violated on column '{column}' in table '{table}'")]
    NullViolation { table: String, column: String },

    #[error("index on column '{column}' was released by its owner")]
    IndexDetached { column: String },

    #[error(
        "index corruption on column '{column}': key {key} expected at {expected}, index holds {found}"
    )]
    IndexCorruption {
        column: String,
        key: String,
        expected: RowAddress,
        found: String,
    },
}

impl ColumnError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ColumnError::IndexCorruption { .. })
    }
}

/// Returns the [`ColumnError`] carried by a report, if any.
pub fn column_error(report: &eyre::Report) -> Option<&ColumnError> {
    report.downcast_ref::<ColumnError>()
}
