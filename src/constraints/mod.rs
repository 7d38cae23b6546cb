//! # Constraint Hooks
//!
//! A [`Constraint`] is a named rule run against every row cursor taking part
//! in a commit. The codec itself only knows about null and type checks; richer
//! rules (UNIQUE across rows, FOREIGN KEY, CHECK) are supplied by the table
//! layer as further implementations of the trait.
//!
//! ## Provided Rules
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | [`NamedConstraint`] | Placeholder carrying only a name. `check` is unsupported |
//! | [`NotNullConstraint`] | Fails on the first NOT NULL column whose null bit is clear |
//!
//! ## Usage
//!
//! ```ignore
//! let rule = NotNullConstraint::new("orders_not_null");
//! let slot = RowSlot::new(&mut page, row_offset, txn);
//! rule.check(&layout, &[&slot], txn)?;
//! ```
//!
//! Example error message:
//! - "NOT NULL constraint violated on column 'email' in table 'users'"

use eyre::{bail, Result};

use crate::error::ColumnError;
use crate::interface::RowCursor;
use crate::layout::RowLayout;
use crate::types::TxnId;

pub trait Constraint {
    fn name(&self) -> &str;

    /// Validates the participating rows. Rules without an implementation
    /// report themselves as unsupported.
    fn check(&self, _layout: &RowLayout, _cursors: &[&dyn RowCursor], _txn: TxnId) -> Result<()> {
        bail!(
            "constraint '{}' does not implement validation",
            self.name()
        )
    }
}

/// A constraint known only by name, such as one loaded from a catalog whose
/// rule lives in another component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedConstraint {
    name: String,
}

impl NamedConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Constraint for NamedConstraint {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotNullConstraint {
    name: String,
}

impl NotNullConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Constraint for NotNullConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, layout: &RowLayout, cursors: &[&dyn RowCursor], _txn: TxnId) -> Result<()> {
        for cursor in cursors {
            let buf = cursor.buffer();
            let row = cursor.row_offset();
            if let Some(column) = layout
                .columns()
                .iter()
                .find(|c| c.is_not_null() && c.is_null(buf, row))
            {
                return Err(ColumnError::NullViolation {
                    table: layout.table_name().to_string(),
                    column: column.name().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
