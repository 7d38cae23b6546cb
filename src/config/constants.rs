//! # Row Format Constants
//!
//! This module centralizes every constant that shapes the binary row format.
//! Changing any value here changes the on-disk layout of every existing row,
//! so treat each one as part of the file format.
//!
//! ## Dependency Graph
//!
//! ```text
//! LENGTH_PREFIX_SIZE (1 byte)
//!       │
//!       └─> MAX_VARLEN_CAPACITY (255)
//!             The prefix is a single unsigned byte, so the payload of a
//!             variable-length slot can never exceed u8::MAX bytes.
//!             │
//!             └─> DEFAULT_BLOB_CAPACITY (must be <=)
//!
//! MAX_NUMERIC_PRECISION (18)
//!       │
//!       └─> NUMERIC_WIDTH (8 bytes)
//!             Every NUMERIC(p, s) with p <= 18 fits an i64 unscaled value.
//! ```
//!
//! ## Fixed Widths
//!
//! | Type | Width (bytes) | Encoding |
//! |------|---------------|----------|
//! | BOOLEAN | 1 | 0 / 1 |
//! | BYTE | 1 | two's complement |
//! | SHORT | 2 | big-endian i16 |
//! | INT | 4 | big-endian i32 |
//! | LONG | 8 | big-endian i64 |
//! | DOUBLE | 8 | big-endian IEEE-754 bits |
//! | DATE | 8 | big-endian i64 epoch milliseconds (UTC) |
//! | NUMERIC | 8 | big-endian i64 unscaled value |
//! | IDENTITY | 8 | big-endian i64 |

// ============================================================================
// FIXED-WIDTH TYPES
// ============================================================================

pub const BOOLEAN_WIDTH: usize = 1;
pub const BYTE_WIDTH: usize = 1;
pub const SHORT_WIDTH: usize = 2;
pub const INT_WIDTH: usize = 4;
pub const LONG_WIDTH: usize = 8;
pub const DOUBLE_WIDTH: usize = 8;
pub const DATE_WIDTH: usize = 8;
pub const NUMERIC_WIDTH: usize = 8;
pub const IDENTITY_WIDTH: usize = 8;

// ============================================================================
// VARIABLE-LENGTH TYPES
// These constants are tightly coupled - the prefix width bounds the capacity
// ============================================================================

/// Width of the length prefix stored in front of every variable-length value.
pub const LENGTH_PREFIX_SIZE: usize = 1;

/// Largest declared payload capacity of a VARCHAR/VARBINARY/BINARY/BLOB column.
pub const MAX_VARLEN_CAPACITY: usize = u8::MAX as usize;

/// Capacity used by BLOB columns declared without an explicit length.
pub const DEFAULT_BLOB_CAPACITY: usize = MAX_VARLEN_CAPACITY;

/// Maximum encoded width of one UTF-16 code unit in the text codec.
pub const MAX_BYTES_PER_UNIT: usize = 3;

const _: () = assert!(
    MAX_VARLEN_CAPACITY < (1 << (8 * LENGTH_PREFIX_SIZE)),
    "MAX_VARLEN_CAPACITY must be representable in the length prefix"
);

const _: () = assert!(
    DEFAULT_BLOB_CAPACITY <= MAX_VARLEN_CAPACITY,
    "DEFAULT_BLOB_CAPACITY must be <= MAX_VARLEN_CAPACITY"
);

// ============================================================================
// NUMERIC
// ============================================================================

/// Largest precision whose unscaled value always fits an i64.
pub const MAX_NUMERIC_PRECISION: u8 = 18;

const _: () = assert!(
    NUMERIC_WIDTH == std::mem::size_of::<i64>(),
    "NUMERIC is stored as an i64 unscaled value"
);

const _: () = assert!(
    (MAX_NUMERIC_PRECISION as u32) < i64::MAX.ilog10() + 1,
    "every NUMERIC(MAX_NUMERIC_PRECISION) value must fit an i64"
);

// ============================================================================
// COLUMN FLAGS
// ============================================================================

/// Sentinel stored in the descriptor when auto-increment is disabled.
pub const NO_AUTO_INCREMENT: i64 = -1;

/// Seed given to IDENTITY columns that do not declare one.
pub const DEFAULT_IDENTITY_SEED: i64 = 1;

const _: () = assert!(
    DEFAULT_IDENTITY_SEED > NO_AUTO_INCREMENT,
    "a valid seed must never collide with the disabled sentinel"
);

// ============================================================================
// NULL BITMAP
// ============================================================================

/// Columns tracked per bitmap byte.
pub const NULL_BITS_PER_BYTE: usize = 8;
