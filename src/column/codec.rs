//! # Column Codec Dispatch
//!
//! Every column type is encoded by one codec. Codecs share the
//! [`ColumnCodec`] trait, whose provided methods describe the fallback path:
//!
//! ```text
//!   get_long / get_integer / get_double / get_boolean
//!        └─> get_string  -> parse        (Malformed on failure)
//!   set_long / set_integer / set_double
//!        └─> format      -> set_string
//!   get_bytes / set_bytes / get_date / set_date
//!        └─> Unsupported
//! ```
//!
//! Codecs with a direct byte representation override the numeric accessors,
//! so the string round-trip only runs where no exact codec exists (VARCHAR
//! holding digits, NUMERIC assigned from a double).
//!
//! [`Codec`] is the closed set of codecs. `Codec::for_type` matches every
//! [`ColumnType`], so adding a type without a codec fails to compile.
//!
//! ## Calling Convention
//!
//! Codec methods receive the owning [`Column`] (for name, capacity and options)
//! and `pos`, the absolute position of the value bytes inside `buf`. Null
//! handling happens in `Column` before a codec is reached: a codec always
//! reads or writes a present value.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use eyre::Result;

use super::fixed::{BooleanCodec, DateCodec, DoubleCodec, IntegerCodec, NumericCodec};
use super::varlen::{BytesCodec, VarcharCodec};
use super::Column;
use crate::error::ColumnError;
use crate::interface::ResultSink;
use crate::types::ColumnType;

pub trait ColumnCodec {
    fn get_string(&self, col: &Column, buf: &[u8], pos: usize) -> Result<String>;

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()>;

    /// Streams the value to `sink` using the sink method matching the type.
    fn write_to(&self, col: &Column, buf: &[u8], pos: usize, sink: &mut dyn ResultSink)
        -> Result<()>;

    fn get_integer(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i32> {
        parse_text(col, &self.get_string(col, buf, pos)?)
    }

    fn set_integer(&self, col: &Column, buf: &mut [u8], pos: usize, value: i32) -> Result<()> {
        self.set_string(col, buf, pos, &value.to_string())
    }

    fn get_long(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        parse_text(col, &self.get_string(col, buf, pos)?)
    }

    fn set_long(&self, col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        self.set_string(col, buf, pos, &value.to_string())
    }

    fn get_double(&self, col: &Column, buf: &[u8], pos: usize) -> Result<f64> {
        parse_text(col, &self.get_string(col, buf, pos)?)
    }

    fn set_double(&self, col: &Column, buf: &mut [u8], pos: usize, value: f64) -> Result<()> {
        self.set_string(col, buf, pos, &value.to_string())
    }

    fn get_boolean(&self, col: &Column, buf: &[u8], pos: usize) -> Result<bool> {
        parse_bool(col, &self.get_string(col, buf, pos)?)
    }

    fn set_boolean(&self, col: &Column, buf: &mut [u8], pos: usize, value: bool) -> Result<()> {
        self.set_long(col, buf, pos, value as i64)
    }

    fn get_bytes(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<Vec<u8>> {
        Err(unsupported(col, "get_bytes"))
    }

    fn set_bytes(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: &[u8]) -> Result<()> {
        Err(unsupported(col, "set_bytes"))
    }

    fn get_date(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<DateTime<Utc>> {
        Err(unsupported(col, "get_date"))
    }

    fn set_date(
        &self,
        col: &Column,
        _buf: &mut [u8],
        _pos: usize,
        _value: DateTime<Utc>,
    ) -> Result<()> {
        Err(unsupported(col, "set_date"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Boolean(BooleanCodec),
    Integer(IntegerCodec),
    Double(DoubleCodec),
    Date(DateCodec),
    Numeric(NumericCodec),
    Varchar(VarcharCodec),
    Bytes(BytesCodec),
}

impl Codec {
    pub fn for_type(ty: ColumnType, precision: u8, scale: u8) -> Self {
        match ty {
            ColumnType::Boolean => Codec::Boolean(BooleanCodec),
            ColumnType::Byte
            | ColumnType::Short
            | ColumnType::Int
            | ColumnType::Long
            | ColumnType::Identity => Codec::Integer(IntegerCodec::new(ty)),
            ColumnType::Double => Codec::Double(DoubleCodec),
            ColumnType::Date => Codec::Date(DateCodec),
            ColumnType::Numeric => Codec::Numeric(NumericCodec::new(precision, scale)),
            ColumnType::Varchar => Codec::Varchar(VarcharCodec),
            ColumnType::Varbinary | ColumnType::Blob => Codec::Bytes(BytesCodec::variable()),
            ColumnType::Binary => Codec::Bytes(BytesCodec::padded()),
        }
    }

    #[inline]
    pub fn as_dyn(&self) -> &dyn ColumnCodec {
        match self {
            Codec::Boolean(c) => c,
            Codec::Integer(c) => c,
            Codec::Double(c) => c,
            Codec::Date(c) => c,
            Codec::Numeric(c) => c,
            Codec::Varchar(c) => c,
            Codec::Bytes(c) => c,
        }
    }
}

pub(crate) fn unsupported(col: &Column, operation: &'static str) -> eyre::Report {
    ColumnError::Unsupported {
        column: col.name().to_string(),
        ty: col.column_type(),
        operation,
    }
    .into()
}

pub(crate) fn malformed(col: &Column, value: &str, reason: impl ToString) -> eyre::Report {
    ColumnError::Malformed {
        column: col.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

pub(crate) fn out_of_range(col: &Column, value: impl ToString) -> eyre::Report {
    ColumnError::OutOfRange {
        column: col.name().to_string(),
        ty: col.column_type(),
        value: value.to_string(),
    }
    .into()
}

pub(crate) fn parse_text<T>(col: &Column, text: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.trim().parse().map_err(|e| malformed(col, text, e))
}

pub(crate) fn parse_bool(col: &Column, text: &str) -> Result<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    match trimmed.parse::<i64>() {
        Ok(v) => Ok(v != 0),
        Err(_) => Err(malformed(col, text, "expected true, false or a number")),
    }
}
