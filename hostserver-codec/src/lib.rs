//! Codecs for the IBM i host server protocol
//!
//! This crate converts between Rust values and the legacy layouts used on
//! the wire:
//! - EBCDIC CCSID 37 (and 1140) text via built-in tables
//! - Other CCSIDs through the CCSID to encoding-name table
//! - Packed decimal, zoned decimal and DECFLOAT(16/34)
//! - Big-endian binary integers and floats
//! - Hex strings for diagnostics
//!
//! Nothing here performs I/O.

pub mod binary;
pub mod ccsid;
pub mod codec;
pub mod decimal;
pub mod ebcdic;
pub mod error;
pub mod hex;
pub mod text;

pub use ccsid::{CCSID_EBCDIC_US, CCSID_HEX, CCSID_UTF8, CCSID_UTF16, encoding_name};
pub use codec::Codec;
pub use decimal::{
    decfloat16_to_string, decfloat34_to_string, decode_packed, decode_packed_f64, decode_zoned,
    decode_zoned_f64, encode_packed, encode_packed_f64, encode_packed_into, encode_zoned,
    encode_zoned_f64, encode_zoned_into, packed_length,
};
pub use ebcdic::{EBCDIC_SPACE, EbcdicTable, SUBSTITUTE};
pub use error::{HostServerError, HostServerResult};
pub use hex::{bytes_to_hex, hex_dump_line, hex_to_bytes};
pub use text::TextEncoding;
