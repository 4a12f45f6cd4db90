//! Packed decimal
//!
//! `num_digits` BCD nibbles followed by one sign nibble, stored in
//! `num_digits / 2 + 1` bytes. When `num_digits` is even the field has one
//! spare nibble, which is written as a leading zero.
//!
//! Example: -123456 with 6 digits is `0x01 0x23 0x45 0x6D`.

use super::{
    DecimalDigits, check_digit, check_precision, decompose_f64, format_decimal, is_negative_sign,
    parse_decimal, to_f64,
};
use crate::error::{HostServerError, HostServerResult};

const POSITIVE_SIGN: u8 = 0x0F;
const NEGATIVE_SIGN: u8 = 0x0D;

/// Byte length of a packed field with `num_digits` digits
pub fn packed_length(num_digits: usize) -> usize {
    num_digits / 2 + 1
}

/// Encode a decimal string (e.g. `-123.45`) as packed decimal
pub fn encode_packed(text: &str, num_digits: usize, scale: usize) -> HostServerResult<Vec<u8>> {
    Ok(pack(&parse_decimal(text, num_digits, scale)?))
}

/// Encode an `f64` as packed decimal
pub fn encode_packed_f64(value: f64, num_digits: usize, scale: usize) -> HostServerResult<Vec<u8>> {
    Ok(pack(&decompose_f64(value, num_digits, scale)?))
}

/// Encode a decimal string into `out` at `offset`
///
/// `out` is only written once the value has been fully validated.
pub fn encode_packed_into(
    text: &str,
    num_digits: usize,
    scale: usize,
    out: &mut [u8],
    offset: usize,
) -> HostServerResult<()> {
    let field = field_mut(out, offset, packed_length(num_digits))?;
    let packed = encode_packed(text, num_digits, scale)?;
    field.copy_from_slice(&packed);
    Ok(())
}

/// Decode a packed field at `offset` to a decimal string
pub fn decode_packed(
    bytes: &[u8],
    offset: usize,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<String> {
    check_precision(num_digits, scale)?;
    Ok(format_decimal(&unpack(bytes, offset, num_digits)?, scale))
}

/// Decode a packed field at `offset` to an `f64`
pub fn decode_packed_f64(
    bytes: &[u8],
    offset: usize,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<f64> {
    check_precision(num_digits, scale)?;
    to_f64(&unpack(bytes, offset, num_digits)?, scale)
}

fn pack(value: &DecimalDigits) -> Vec<u8> {
    let length = packed_length(value.digits.len());
    let pad = 2 * length - 1 - value.digits.len();

    let sign = if value.negative {
        NEGATIVE_SIGN
    } else {
        POSITIVE_SIGN
    };
    let nibbles: Vec<u8> = std::iter::repeat_n(0u8, pad)
        .chain(value.digits.iter().copied())
        .chain(std::iter::once(sign))
        .collect();

    nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect()
}

fn unpack(bytes: &[u8], offset: usize, num_digits: usize) -> HostServerResult<DecimalDigits> {
    let length = packed_length(num_digits);
    let field = field(bytes, offset, length)?;
    let pad = 2 * length - 1 - num_digits;

    let mut digits = Vec::with_capacity(num_digits);
    for index in pad..(2 * length - 1) {
        let byte = field[index / 2];
        let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        digits.push(check_digit(nibble)?);
    }
    let negative = is_negative_sign(field[length - 1] & 0x0F);

    Ok(DecimalDigits { negative, digits })
}

fn field(bytes: &[u8], offset: usize, length: usize) -> HostServerResult<&[u8]> {
    bytes
        .get(offset..offset.saturating_add(length))
        .ok_or_else(|| {
            HostServerError::InvalidData(format!(
                "packed field of {} byte(s) at offset {} exceeds buffer of {} byte(s)",
                length,
                offset,
                bytes.len()
            ))
        })
}

fn field_mut(bytes: &mut [u8], offset: usize, length: usize) -> HostServerResult<&mut [u8]> {
    let available = bytes.len();
    bytes
        .get_mut(offset..offset.saturating_add(length))
        .ok_or_else(|| {
            HostServerError::InvalidData(format!(
                "packed field of {} byte(s) at offset {} exceeds buffer of {} byte(s)",
                length, offset, available
            ))
        })
}
