//! # Codec Configuration
//!
//! This module holds the two kinds of configuration the codec has:
//!
//! - [`constants`]: format constants. They define the binary layout and are
//!   checked against each other at compile time.
//! - [`CodecOptions`]: runtime behaviour chosen once when a row layout is built
//!   and frozen into every column of that layout.
//!
//! ## Overflow Policy
//!
//! Variable-length columns have a declared capacity. Input that does not fit is
//! handled according to [`OverflowPolicy`]:
//!
//! | Policy | Behaviour |
//! |--------|-----------|
//! | `Reject` (default) | The write fails with `ColumnError::Overflow`, the row is untouched |
//! | `Truncate` | The value is clipped to the capacity at a code-unit boundary |
//!
//! `Truncate` exists for rows written by older writers that relied on clipping.
//!
//! ## Usage
//!
//! ```ignore
//! use rowcodec::config::{CodecOptions, OverflowPolicy};
//!
//! let layout = RowLayout::builder("legacy")
//!     .options(CodecOptions::default().with_overflow(OverflowPolicy::Truncate))
//!     .column(ColumnDef::varchar("name", 10))
//!     .build()?;
//! ```

pub mod constants;
pub use constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    #[default]
    Reject,
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    pub overflow: OverflowPolicy,
}

impl CodecOptions {
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn truncates(&self) -> bool {
        self.overflow == OverflowPolicy::Truncate
    }
}
