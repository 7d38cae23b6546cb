//! # Value Encodings
//!
//! Byte-level codecs shared by every column variant. Nothing in this module
//! knows about columns, null bits or rows: each function takes a slice and a
//! position and either writes or reads one value.
//!
//! - `fixed`: big-endian pack/unpack for 1, 2, 4 and 8 byte integers and IEEE
//!   doubles. Bytes are produced with explicit shifts so the format never
//!   depends on host endianness.
//! - `text`: the 1-3 bytes per UTF-16 unit text codec used by VARCHAR, with
//!   capacity-bounded encoding.
//! - `hex`: lowercase hex rendering used for the text form of binary values.

pub mod fixed;
pub mod hex;
pub mod text;
