//! # Fixed-Width Codecs
//!
//! | Codec | Types | Stored as |
//! |-------|-------|-----------|
//! | `BooleanCodec` | BOOLEAN | `0x00` / `0x01` |
//! | `IntegerCodec` | BYTE, SHORT, INT, LONG, IDENTITY | big-endian two's complement, 1/2/4/8 bytes |
//! | `DoubleCodec` | DOUBLE | big-endian IEEE-754 bits |
//! | `DateCodec` | DATE | big-endian i64 milliseconds since the Unix epoch, UTC |
//! | `NumericCodec` | NUMERIC(p, s) | big-endian i64 unscaled value, `value = unscaled / 10^s` |
//!
//! All integer widths share one codec parameterized by width. Narrowing writes
//! are range-checked and fail with `OutOfRange` instead of wrapping.
//!
//! ## Text Forms
//!
//! | Type | `get_string` | `set_string` accepts |
//! |------|--------------|----------------------|
//! | BOOLEAN | `true` / `false` | `true`, `false` (any case), integers |
//! | integers | decimal | decimal with surrounding whitespace |
//! | DOUBLE | shortest round-trip decimal | anything `f64::from_str` accepts |
//! | DATE | `YYYY-MM-DD HH:MM:SS.mmm` | that form, ISO `T` separator, or `YYYY-MM-DD` |
//! | NUMERIC | exactly `s` fraction digits | decimal, rounded half away from zero to `s` digits |

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use eyre::Result;

use super::codec::{malformed, out_of_range, parse_bool, parse_text, unsupported, ColumnCodec};
use super::Column;
use crate::config::MAX_NUMERIC_PRECISION;
use crate::encoding::fixed;
use crate::interface::ResultSink;
use crate::types::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanCodec;

impl ColumnCodec for BooleanCodec {
    fn get_string(&self, col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(self.get_boolean(col, buf, pos)?.to_string())
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let value = parse_bool(col, value)?;
        self.set_boolean(col, buf, pos, value)
    }

    fn write_to(
        &self,
        col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_long(self.get_long(col, buf, pos)?)
    }

    fn get_integer(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i32> {
        Ok(self.get_boolean(col, buf, pos)? as i32)
    }

    fn get_long(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        Ok(self.get_boolean(col, buf, pos)? as i64)
    }

    fn set_long(&self, col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        self.set_boolean(col, buf, pos, value != 0)
    }

    fn get_double(&self, col: &Column, buf: &[u8], pos: usize) -> Result<f64> {
        Ok(if self.get_boolean(col, buf, pos)? { 1.0 } else { 0.0 })
    }

    fn get_boolean(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<bool> {
        Ok(buf[pos] != 0)
    }

    fn set_boolean(&self, _col: &Column, buf: &mut [u8], pos: usize, value: bool) -> Result<()> {
        buf[pos] = value as u8;
        Ok(())
    }
}

/// 2^63 as an `f64`, exactly representable unlike `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerCodec {
    width: usize,
    min: i64,
    max: i64,
}

impl IntegerCodec {
    pub fn new(ty: ColumnType) -> Self {
        debug_assert!(ty.is_integral());
        let width = ty.fixed_width().unwrap_or(8);
        let (min, max) = if width >= 8 {
            (i64::MIN, i64::MAX)
        } else {
            let half = 1i64 << (8 * width - 1);
            (-half, half - 1)
        };
        Self { width, min, max }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn read(&self, buf: &[u8], pos: usize) -> i64 {
        fixed::get_int(buf, pos, self.width)
    }

    fn write(&self, col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        if value < self.min || value > self.max {
            return Err(out_of_range(col, value));
        }
        fixed::put_uint(buf, pos, value as u64, self.width);
        Ok(())
    }
}

impl ColumnCodec for IntegerCodec {
    fn get_string(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(self.read(buf, pos).to_string())
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let parsed: i128 = parse_text(col, value)?;
        let parsed = i64::try_from(parsed).map_err(|_| out_of_range(col, value.trim()))?;
        self.write(col, buf, pos, parsed)
    }

    fn write_to(
        &self,
        _col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_long(self.read(buf, pos))
    }

    fn get_integer(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i32> {
        let value = self.read(buf, pos);
        i32::try_from(value).map_err(|_| out_of_range(col, value))
    }

    fn set_integer(&self, col: &Column, buf: &mut [u8], pos: usize, value: i32) -> Result<()> {
        self.write(col, buf, pos, value as i64)
    }

    fn get_long(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        Ok(self.read(buf, pos))
    }

    fn set_long(&self, col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        self.write(col, buf, pos, value)
    }

    fn get_double(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<f64> {
        Ok(self.read(buf, pos) as f64)
    }

    fn set_double(&self, col: &Column, buf: &mut [u8], pos: usize, value: f64) -> Result<()> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(malformed(col, &value.to_string(), "not an integral value"));
        }
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if value < -I64_BOUND || value >= I64_BOUND {
            return Err(out_of_range(col, value));
        }
        self.write(col, buf, pos, value as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleCodec;

impl ColumnCodec for DoubleCodec {
    fn get_string(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(fixed::get_f64(buf, pos).to_string())
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let parsed: f64 = parse_text(col, value)?;
        fixed::put_f64(buf, pos, parsed);
        Ok(())
    }

    fn write_to(
        &self,
        _col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_double(fixed::get_f64(buf, pos))
    }

    fn get_integer(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i32> {
        let value = fixed::get_f64(buf, pos);
        let whole = value.trunc();
        if !value.is_finite() || whole < i32::MIN as f64 || whole > i32::MAX as f64 {
            return Err(out_of_range(col, value));
        }
        Ok(whole as i32)
    }

    fn get_long(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        let value = fixed::get_f64(buf, pos);
        let whole = value.trunc();
        if !value.is_finite() || whole < -I64_BOUND || whole >= I64_BOUND {
            return Err(out_of_range(col, value));
        }
        Ok(whole as i64)
    }

    fn set_long(&self, _col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        fixed::put_f64(buf, pos, value as f64);
        Ok(())
    }

    fn get_double(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<f64> {
        Ok(fixed::get_f64(buf, pos))
    }

    fn set_double(&self, _col: &Column, buf: &mut [u8], pos: usize, value: f64) -> Result<()> {
        fixed::put_f64(buf, pos, value);
        Ok(())
    }
}

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DATE_TIME_INPUTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_INPUT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCodec;

impl DateCodec {
    fn parse(col: &Column, text: &str) -> Result<DateTime<Utc>> {
        let trimmed = text.trim();
        for format in DATE_TIME_INPUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
        let midnight = NaiveDate::parse_from_str(trimmed, DATE_INPUT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| malformed(col, text, "expected YYYY-MM-DD[ HH:MM:SS[.fff]]"))?;
        Ok(Utc.from_utc_datetime(&midnight))
    }
}

impl ColumnCodec for DateCodec {
    fn get_string(&self, col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(self
            .get_date(col, buf, pos)?
            .format(DATE_TIME_FORMAT)
            .to_string())
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let date = Self::parse(col, value)?;
        self.set_date(col, buf, pos, date)
    }

    fn write_to(
        &self,
        _col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_long(fixed::get_i64(buf, pos))
    }

    fn get_integer(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<i32> {
        Err(unsupported(col, "get_integer"))
    }

    fn get_long(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        Ok(fixed::get_i64(buf, pos))
    }

    fn set_long(&self, _col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        fixed::put_i64(buf, pos, value);
        Ok(())
    }

    fn get_double(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<f64> {
        Err(unsupported(col, "get_double"))
    }

    fn set_double(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: f64) -> Result<()> {
        Err(unsupported(col, "set_double"))
    }

    fn get_boolean(&self, col: &Column, _buf: &[u8], _pos: usize) -> Result<bool> {
        Err(unsupported(col, "get_boolean"))
    }

    fn set_boolean(&self, col: &Column, _buf: &mut [u8], _pos: usize, _value: bool) -> Result<()> {
        Err(unsupported(col, "set_boolean"))
    }

    fn get_date(&self, col: &Column, buf: &[u8], pos: usize) -> Result<DateTime<Utc>> {
        let millis = fixed::get_i64(buf, pos);
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| out_of_range(col, millis))
    }

    fn set_date(
        &self,
        _col: &Column,
        buf: &mut [u8],
        pos: usize,
        value: DateTime<Utc>,
    ) -> Result<()> {
        fixed::put_i64(buf, pos, value.timestamp_millis());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericCodec {
    precision: u8,
    scale: u8,
}

impl NumericCodec {
    pub fn new(precision: u8, scale: u8) -> Self {
        debug_assert!(precision <= MAX_NUMERIC_PRECISION && scale <= precision);
        Self { precision, scale }
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    fn factor(&self) -> i64 {
        10i64.pow(self.scale as u32)
    }

    fn limit(&self) -> i128 {
        10i128.pow(self.precision as u32)
    }

    fn write(&self, col: &Column, buf: &mut [u8], pos: usize, unscaled: i128) -> Result<()> {
        if unscaled.abs() >= self.limit() {
            return Err(out_of_range(col, self.render(unscaled)));
        }
        fixed::put_i64(buf, pos, unscaled as i64);
        Ok(())
    }

    fn render(&self, unscaled: i128) -> String {
        let digits = unscaled.unsigned_abs().to_string();
        let sign = if unscaled < 0 { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return format!("{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        format!("{}{}.{}", sign, int_part, frac_part)
    }

    /// Parses decimal text into an unscaled value at this codec's scale,
    /// rounding half away from zero.
    fn parse(&self, col: &Column, text: &str) -> Result<i128> {
        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(malformed(col, text, "expected a decimal number"));
        }

        let significant = int_part.trim_start_matches('0');
        if significant.len() > self.precision as usize {
            return Err(out_of_range(col, trimmed));
        }

        let scale = self.scale as usize;
        let mut unscaled: i128 = 0;
        for b in significant.bytes() {
            unscaled = unscaled * 10 + (b - b'0') as i128;
        }
        let frac = frac_part.as_bytes();
        for i in 0..scale {
            let digit = frac.get(i).map_or(0, |b| b - b'0');
            unscaled = unscaled * 10 + digit as i128;
        }
        if frac.get(scale).is_some_and(|b| *b >= b'5') {
            unscaled += 1;
        }

        Ok(if negative { -unscaled } else { unscaled })
    }
}

impl ColumnCodec for NumericCodec {
    fn get_string(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<String> {
        Ok(self.render(fixed::get_i64(buf, pos) as i128))
    }

    fn set_string(&self, col: &Column, buf: &mut [u8], pos: usize, value: &str) -> Result<()> {
        let unscaled = self.parse(col, value)?;
        self.write(col, buf, pos, unscaled)
    }

    fn write_to(
        &self,
        col: &Column,
        buf: &[u8],
        pos: usize,
        sink: &mut dyn ResultSink,
    ) -> Result<()> {
        sink.write_string(&self.get_string(col, buf, pos)?)
    }

    fn get_integer(&self, col: &Column, buf: &[u8], pos: usize) -> Result<i32> {
        let value = self.get_long(col, buf, pos)?;
        i32::try_from(value).map_err(|_| out_of_range(col, value))
    }

    fn get_long(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<i64> {
        Ok(fixed::get_i64(buf, pos) / self.factor())
    }

    fn set_long(&self, col: &Column, buf: &mut [u8], pos: usize, value: i64) -> Result<()> {
        self.write(col, buf, pos, value as i128 * self.factor() as i128)
    }

    fn get_double(&self, _col: &Column, buf: &[u8], pos: usize) -> Result<f64> {
        Ok(fixed::get_i64(buf, pos) as f64 / self.factor() as f64)
    }
}
