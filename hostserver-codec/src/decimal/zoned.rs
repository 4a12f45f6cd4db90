//! Zoned decimal
//!
//! One byte per digit: the low nibble is the digit and the high nibble is
//! the zone (`0xF`). The zone of the last byte carries the sign instead;
//! `0xB` and `0xD` are negative. The decoder ignores every other zone.

use super::{
    DecimalDigits, check_digit, check_precision, decompose_f64, format_decimal, is_negative_sign,
    parse_decimal, to_f64,
};
use crate::error::{HostServerError, HostServerResult};

const ZONE: u8 = 0xF0;
const NEGATIVE_ZONE: u8 = 0xD0;

/// Encode a decimal string as zoned decimal (`num_digits` bytes)
pub fn encode_zoned(text: &str, num_digits: usize, scale: usize) -> HostServerResult<Vec<u8>> {
    Ok(zone(&parse_decimal(text, num_digits, scale)?))
}

/// Encode an `f64` as zoned decimal
pub fn encode_zoned_f64(value: f64, num_digits: usize, scale: usize) -> HostServerResult<Vec<u8>> {
    Ok(zone(&decompose_f64(value, num_digits, scale)?))
}

/// Encode a decimal string into `out` at `offset`, writing nothing on error
pub fn encode_zoned_into(
    text: &str,
    num_digits: usize,
    scale: usize,
    out: &mut [u8],
    offset: usize,
) -> HostServerResult<()> {
    let available = out.len();
    let field = out
        .get_mut(offset..offset.saturating_add(num_digits))
        .ok_or_else(|| out_of_range(num_digits, offset, available))?;
    let zoned = encode_zoned(text, num_digits, scale)?;
    field.copy_from_slice(&zoned);
    Ok(())
}

/// Decode a zoned field at `offset` to a decimal string
pub fn decode_zoned(
    bytes: &[u8],
    offset: usize,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<String> {
    check_precision(num_digits, scale)?;
    Ok(format_decimal(&unzone(bytes, offset, num_digits)?, scale))
}

/// Decode a zoned field at `offset` to an `f64`
pub fn decode_zoned_f64(
    bytes: &[u8],
    offset: usize,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<f64> {
    check_precision(num_digits, scale)?;
    to_f64(&unzone(bytes, offset, num_digits)?, scale)
}

fn zone(value: &DecimalDigits) -> Vec<u8> {
    let mut bytes: Vec<u8> = value.digits.iter().map(|&d| ZONE | d).collect();
    if value.negative {
        if let Some(last) = bytes.last_mut() {
            *last = NEGATIVE_ZONE | (*last & 0x0F);
        }
    }
    bytes
}

fn unzone(bytes: &[u8], offset: usize, num_digits: usize) -> HostServerResult<DecimalDigits> {
    let field = bytes
        .get(offset..offset.saturating_add(num_digits))
        .ok_or_else(|| out_of_range(num_digits, offset, bytes.len()))?;

    let digits = field
        .iter()
        .map(|&b| check_digit(b & 0x0F))
        .collect::<HostServerResult<Vec<u8>>>()?;
    let negative = is_negative_sign(field[num_digits - 1] >> 4);

    Ok(DecimalDigits { negative, digits })
}

fn out_of_range(length: usize, offset: usize, available: usize) -> HostServerError {
    HostServerError::InvalidData(format!(
        "zoned field of {} byte(s) at offset {} exceeds buffer of {} byte(s)",
        length, offset, available
    ))
}
