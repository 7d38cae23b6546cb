//! # Storable Column Types
//!
//! `ColumnType` is the closed set of wire types a column can hold. Like the
//! record-layer `DataType`, it is metadata-free: declared capacities, numeric
//! precision and scale live on the column definition, not in the enum.
//!
//! ## Relational Type Tags
//!
//! Every variant carries the relational type tag reported to result consumers.
//! Tags follow the JDBC `java.sql.Types` numbering so that drivers can map
//! them without a lookup table:
//!
//! | Variant | Tag | Width |
//! |---------|-----|-------|
//! | Boolean | 16 | 1 |
//! | Byte | -6 | 1 |
//! | Short | 5 | 2 |
//! | Int | 4 | 4 |
//! | Long | -5 | 8 |
//! | Double | 8 | 8 |
//! | Date | 93 | 8 |
//! | Varchar | 12 | capacity + 1 |
//! | Varbinary | -3 | capacity + 1 |
//! | Binary | -2 | capacity + 1 |
//! | Blob | 2004 | capacity + 1 |
//! | Numeric | 2 | 8 |
//! | Identity | -5 | 8 |

use std::fmt;

use crate::config::{
    BOOLEAN_WIDTH, BYTE_WIDTH, DATE_WIDTH, DOUBLE_WIDTH, IDENTITY_WIDTH, INT_WIDTH, LONG_WIDTH,
    NUMERIC_WIDTH, SHORT_WIDTH,
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Boolean = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Double = 5,
    Date = 6,
    Identity = 7,
    Numeric = 8,

    Varchar = 20,
    Varbinary = 21,
    Binary = 22,
    Blob = 23,
}

impl ColumnType {
    pub const ALL: [ColumnType; 13] = [
        ColumnType::Boolean,
        ColumnType::Byte,
        ColumnType::Short,
        ColumnType::Int,
        ColumnType::Long,
        ColumnType::Double,
        ColumnType::Date,
        ColumnType::Identity,
        ColumnType::Numeric,
        ColumnType::Varchar,
        ColumnType::Varbinary,
        ColumnType::Binary,
        ColumnType::Blob,
    ];

    /// Relational type tag (JDBC numbering).
    pub fn sql_type(&self) -> i32 {
        match self {
            ColumnType::Boolean => 16,
            ColumnType::Byte => -6,
            ColumnType::Short => 5,
            ColumnType::Int => 4,
            ColumnType::Long | ColumnType::Identity => -5,
            ColumnType::Double => 8,
            ColumnType::Date => 93,
            ColumnType::Numeric => 2,
            ColumnType::Varchar => 12,
            ColumnType::Varbinary => -3,
            ColumnType::Binary => -2,
            ColumnType::Blob => 2004,
        }
    }

    /// Wire width of fixed-width types. `None` for length-prefixed types whose
    /// width depends on the declared capacity.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ColumnType::Boolean => Some(BOOLEAN_WIDTH),
            ColumnType::Byte => Some(BYTE_WIDTH),
            ColumnType::Short => Some(SHORT_WIDTH),
            ColumnType::Int => Some(INT_WIDTH),
            ColumnType::Long => Some(LONG_WIDTH),
            ColumnType::Double => Some(DOUBLE_WIDTH),
            ColumnType::Date => Some(DATE_WIDTH),
            ColumnType::Identity => Some(IDENTITY_WIDTH),
            ColumnType::Numeric => Some(NUMERIC_WIDTH),
            ColumnType::Varchar | ColumnType::Varbinary | ColumnType::Binary | ColumnType::Blob => {
                None
            }
        }
    }

    pub fn is_variable(&self) -> bool {
        self.fixed_width().is_none()
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ColumnType::Byte
                | ColumnType::Short
                | ColumnType::Int
                | ColumnType::Long
                | ColumnType::Identity
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Byte => "BYTE",
            ColumnType::Short => "SHORT",
            ColumnType::Int => "INT",
            ColumnType::Long => "LONG",
            ColumnType::Double => "DOUBLE",
            ColumnType::Date => "DATE",
            ColumnType::Identity => "IDENTITY",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Varbinary => "VARBINARY",
            ColumnType::Binary => "BINARY",
            ColumnType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ColumnType {
    type Error = eyre::Report;

    fn try_from(tag: u8) -> eyre::Result<Self> {
        ColumnType::ALL
            .iter()
            .copied()
            .find(|ty| *ty as u8 == tag)
            .ok_or_else(|| eyre::eyre!("unknown column type discriminant {}", tag))
    }
}
