//! # Collaborator Interfaces
//!
//! The codec is called by the table layer and calls back into three external
//! collaborators. Each is a trait here so the table layer can plug in its own
//! implementation:
//!
//! | Trait | Role | Used by |
//! |-------|------|---------|
//! | [`Expression`] | Evaluates a value for an assignment | `Column::set` |
//! | [`ResultSink`] | Receives decoded values, one typed write per column | `Column::eval_to_result` |
//! | [`RowCursor`] | Exposes the current row buffer, offset and transaction | `Column::set`, constraints |
//!
//! Small concrete implementations are provided for callers that do not need
//! their own: [`Literal`] (constant expression), [`CollectingSink`] (buffers
//! written values) and [`RowSlot`] (a cursor over a caller-owned buffer).
//!
//! ## Expression Contexts
//!
//! An expression names the context type it is evaluated in. The codec never
//! looks inside the context; it only passes it back to the expression.

use eyre::{bail, Result};

use crate::encoding::hex;
use crate::types::TxnId;

pub trait Expression {
    type Context: ?Sized;

    fn is_null(&self, ctx: &Self::Context) -> Result<bool>;

    fn eval_string(&self, ctx: &Self::Context) -> Result<String>;

    fn eval_long(&self, ctx: &Self::Context) -> Result<i64>;

    fn eval_double(&self, ctx: &Self::Context) -> Result<f64>;

    fn eval_bytes(&self, ctx: &Self::Context) -> Result<Vec<u8>> {
        Ok(self.eval_string(ctx)?.into_bytes())
    }
}

pub trait ResultSink {
    fn write_null(&mut self) -> Result<()>;

    fn write_long(&mut self, value: i64) -> Result<()>;

    fn write_double(&mut self, value: f64) -> Result<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    fn write_string(&mut self, value: &str) -> Result<()>;
}

pub trait RowCursor {
    fn buffer(&self) -> &[u8];

    fn buffer_mut(&mut self) -> &mut [u8];

    fn row_offset(&self) -> usize;

    fn set_dirty(&mut self);

    fn transaction(&self) -> TxnId;
}

/// A constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Expression for Literal {
    type Context = ();

    fn is_null(&self, _ctx: &()) -> Result<bool> {
        Ok(matches!(self, Literal::Null))
    }

    fn eval_string(&self, _ctx: &()) -> Result<String> {
        Ok(match self {
            Literal::Null => String::new(),
            Literal::Boolean(v) => v.to_string(),
            Literal::Long(v) => v.to_string(),
            Literal::Double(v) => v.to_string(),
            Literal::Text(v) => v.clone(),
            Literal::Bytes(v) => hex::encode(v),
        })
    }

    fn eval_long(&self, ctx: &()) -> Result<i64> {
        match self {
            Literal::Null => Ok(0),
            Literal::Boolean(v) => Ok(*v as i64),
            Literal::Long(v) => Ok(*v),
            Literal::Double(v) => {
                if v.fract() != 0.0 || !v.is_finite() {
                    bail!("{} has no exact integer value", v);
                }
                Ok(*v as i64)
            }
            Literal::Text(_) | Literal::Bytes(_) => {
                let text = self.eval_string(ctx)?;
                text.trim()
                    .parse()
                    .map_err(|e| eyre::eyre!("cannot evaluate {:?} as integer: {}", text, e))
            }
        }
    }

    fn eval_double(&self, ctx: &()) -> Result<f64> {
        match self {
            Literal::Null => Ok(0.0),
            Literal::Boolean(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Literal::Long(v) => Ok(*v as f64),
            Literal::Double(v) => Ok(*v),
            Literal::Text(_) | Literal::Bytes(_) => {
                let text = self.eval_string(ctx)?;
                text.trim()
                    .parse()
                    .map_err(|e| eyre::eyre!("cannot evaluate {:?} as double: {}", text, e))
            }
        }
    }

    fn eval_bytes(&self, ctx: &()) -> Result<Vec<u8>> {
        match self {
            Literal::Bytes(v) => Ok(v.clone()),
            _ => Ok(self.eval_string(ctx)?.into_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkValue {
    Null,
    Long(i64),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
}

/// Buffers every value written to it, in order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    values: Vec<SinkValue>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[SinkValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SinkValue> {
        self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl ResultSink for CollectingSink {
    fn write_null(&mut self) -> Result<()> {
        self.values.push(SinkValue::Null);
        Ok(())
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        self.values.push(SinkValue::Long(value));
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.values.push(SinkValue::Double(value));
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.values.push(SinkValue::Bytes(bytes.to_vec()));
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.values.push(SinkValue::Text(value.to_string()));
        Ok(())
    }
}

/// Cursor over one row of a caller-owned buffer.
#[derive(Debug)]
pub struct RowSlot<'a> {
    buf: &'a mut [u8],
    row_offset: usize,
    txn: TxnId,
    dirty: bool,
}

impl<'a> RowSlot<'a> {
    pub fn new(buf: &'a mut [u8], row_offset: usize, txn: TxnId) -> Self {
        Self {
            buf,
            row_offset,
            txn,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl RowCursor for RowSlot<'_> {
    fn buffer(&self) -> &[u8] {
        &*self.buf
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buf
    }

    fn row_offset(&self) -> usize {
        self.row_offset
    }

    fn set_dirty(&mut self) {
        self.dirty = true;
    }

    fn transaction(&self) -> TxnId {
        self.txn
    }
}
