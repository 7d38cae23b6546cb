//! # Big-Endian Fixed-Width Encoding
//!
//! All fixed-width values are stored most significant byte first:
//!
//! ```text
//! i64 -0x0102_0304_0506_0708 -> FE FD FC FB FA F9 F8 F8
//! i16 0x1234                -> 12 34
//! f64 1.0                   -> 3F F0 00 00 00 00 00 00
//! ```
//!
//! Byte order is derived with shifts on `u64`, which makes the encoding
//! identical on every platform and lets the bytes be persisted unchanged.
//! Signed values are sign-extended on read.

#[inline]
pub fn put_uint(buf: &mut [u8], pos: usize, value: u64, width: usize) {
    debug_assert!((1..=8).contains(&width));
    for i in 0..width {
        let shift = 8 * (width - 1 - i);
        buf[pos + i] = (value >> shift) as u8;
    }
}

#[inline]
pub fn get_uint(buf: &[u8], pos: usize, width: usize) -> u64 {
    debug_assert!((1..=8).contains(&width));
    let mut value = 0u64;
    for i in 0..width {
        value = (value << 8) | buf[pos + i] as u64;
    }
    value
}

#[inline]
pub fn get_int(buf: &[u8], pos: usize, width: usize) -> i64 {
    let unused = 64 - 8 * width as u32;
    ((get_uint(buf, pos, width) << unused) as i64) >> unused
}

#[inline]
pub fn put_i64(buf: &mut [u8], pos: usize, value: i64) {
    put_uint(buf, pos, value as u64, 8);
}

#[inline]
pub fn get_i64(buf: &[u8], pos: usize) -> i64 {
    get_uint(buf, pos, 8) as i64
}

#[inline]
pub fn put_f64(buf: &mut [u8], pos: usize, value: f64) {
    put_uint(buf, pos, value.to_bits(), 8);
}

#[inline]
pub fn get_f64(buf: &[u8], pos: usize) -> f64 {
    f64::from_bits(get_uint(buf, pos, 8))
}
