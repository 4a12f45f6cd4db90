//! Fixed-width decimal codecs
//!
//! Packed and zoned decimal share one intermediate form: a sign plus exactly
//! `num_digits` decimal digits, most significant first, with the implied
//! decimal point `scale` digits from the right. The helpers here build that
//! form from a decimal string or an `f64` and render it back to a string.
//!
//! Conversion from `f64` uses no arbitrary-precision types: the value is
//! split into an integer part and a fraction part limited to 15 significant
//! digits, so both fit in a `u64`.

pub mod decfloat;
pub mod packed;
pub mod zoned;

pub use decfloat::{decfloat16_to_string, decfloat34_to_string};
pub use packed::{
    decode_packed, decode_packed_f64, encode_packed, encode_packed_f64, encode_packed_into,
    packed_length,
};
pub use zoned::{
    decode_zoned, decode_zoned_f64, encode_zoned, encode_zoned_f64, encode_zoned_into,
};

use crate::error::{HostServerError, HostServerResult};

/// Significant digits an `f64` carries reliably
const MAX_F64_DIGITS: u32 = 15;

/// Sign plus fixed digit string, the common form of packed and zoned values
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecimalDigits {
    pub negative: bool,
    /// Exactly `num_digits` values in `0..=9`, most significant first
    pub digits: Vec<u8>,
}

pub(crate) fn check_precision(num_digits: usize, scale: usize) -> HostServerResult<()> {
    if num_digits == 0 {
        return Err(HostServerError::InvalidData(
            "number of digits must be at least 1".to_string(),
        ));
    }
    if scale > num_digits {
        return Err(HostServerError::InvalidData(format!(
            "scale {} exceeds number of digits {}",
            scale, num_digits
        )));
    }
    Ok(())
}

/// Parse a decimal string such as `-123.45` into `num_digits` digits
pub(crate) fn parse_decimal(
    text: &str,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<DecimalDigits> {
    check_precision(num_digits, scale)?;

    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(HostServerError::InvalidData(format!(
            "no digits in decimal string {:?}",
            text
        )));
    }
    if let Some(bad) = int_part
        .chars()
        .chain(frac_part.chars())
        .find(|c| !c.is_ascii_digit())
    {
        return Err(HostServerError::InvalidDigit(bad));
    }

    let int_part = int_part.trim_start_matches('0');
    let int_capacity = num_digits - scale;
    if int_part.len() > int_capacity {
        return Err(HostServerError::ValueTooLarge(format!(
            "{} does not fit in {} digit(s) with scale {}",
            text, num_digits, scale
        )));
    }
    if frac_part.len() > scale {
        return Err(HostServerError::ValueTooLarge(format!(
            "{} has more than {} fractional digit(s)",
            text, scale
        )));
    }

    let mut digits = Vec::with_capacity(num_digits);
    digits.resize(int_capacity - int_part.len(), 0);
    digits.extend(int_part.bytes().map(|b| b - b'0'));
    digits.extend(frac_part.bytes().map(|b| b - b'0'));
    digits.resize(num_digits, 0);

    Ok(DecimalDigits { negative, digits })
}

/// Split an `f64` into `num_digits` digits with `scale` fractional digits
///
/// Digits are produced right to left: fractional positions beyond the
/// 15-significant-digit limit are zero, then the rounded fraction, then the
/// integer part, then zero fill. Rounding is half away from zero.
pub(crate) fn decompose_f64(
    value: f64,
    num_digits: usize,
    scale: usize,
) -> HostServerResult<DecimalDigits> {
    check_precision(num_digits, scale)?;
    if value.is_nan() {
        return Err(HostServerError::InvalidData("NaN has no decimal form".to_string()));
    }
    if value.is_infinite() {
        return Err(HostServerError::ValueTooLarge(format!("{} is not finite", value)));
    }

    let negative = value < 0.0;
    let magnitude = value.abs();
    let int_value = magnitude.trunc();
    // 2^64 is exactly representable; anything at or above it overflows u64
    if int_value >= 18_446_744_073_709_551_616.0 {
        return Err(HostServerError::ValueTooLarge(format!(
            "{} does not fit in {} digit(s)",
            value, num_digits
        )));
    }
    let mut integer = int_value as u64;

    let int_digits = count_digits(integer);
    let frac_digits = (scale as u32).min(MAX_F64_DIGITS.saturating_sub(int_digits));
    let frac_limit = 10u64.pow(frac_digits);
    let mut fraction = ((magnitude - int_value) * frac_limit as f64).round() as u64;
    if fraction >= frac_limit {
        fraction -= frac_limit;
        integer = integer.checked_add(1).ok_or_else(|| {
            HostServerError::ValueTooLarge(format!("{} does not fit in {} digit(s)", value, num_digits))
        })?;
    }

    if count_digits(integer) as usize > num_digits - scale {
        return Err(HostServerError::ValueTooLarge(format!(
            "{} does not fit in {} digit(s) with scale {}",
            value, num_digits, scale
        )));
    }

    let mut digits = vec![0u8; num_digits];
    let mut pos = num_digits;
    // Fractional positions the f64 cannot fill stay zero
    pos -= scale - frac_digits as usize;
    for _ in 0..frac_digits {
        pos -= 1;
        digits[pos] = (fraction % 10) as u8;
        fraction /= 10;
    }
    while integer > 0 {
        pos -= 1;
        digits[pos] = (integer % 10) as u8;
        integer /= 10;
    }

    Ok(DecimalDigits { negative, digits })
}

/// Render digits as a decimal string
///
/// Leading zeros are suppressed except for the one digit that must precede
/// the decimal point.
pub(crate) fn format_decimal(value: &DecimalDigits, scale: usize) -> String {
    let split = value.digits.len() - scale;
    let (int_digits, frac_digits) = value.digits.split_at(split);

    let mut text = String::with_capacity(value.digits.len() + 2);
    if value.negative {
        text.push('-');
    }
    match int_digits.iter().position(|&d| d != 0) {
        Some(first) => text.extend(int_digits[first..].iter().map(|&d| (b'0' + d) as char)),
        None => text.push('0'),
    }
    if scale > 0 {
        text.push('.');
        text.extend(frac_digits.iter().map(|&d| (b'0' + d) as char));
    }
    text
}

pub(crate) fn to_f64(value: &DecimalDigits, scale: usize) -> HostServerResult<f64> {
    let text = format_decimal(value, scale);
    text.parse::<f64>()
        .map_err(|e| HostServerError::InvalidData(format!("{}: {}", text, e)))
}

/// Map a digit nibble or zone-stripped byte to a digit
pub(crate) fn check_digit(nibble: u8) -> HostServerResult<u8> {
    if nibble <= 9 {
        Ok(nibble)
    } else {
        Err(HostServerError::InvalidDigit(
            char::from_digit(nibble as u32, 16)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?'),
        ))
    }
}

/// Whether a sign nibble denotes a negative value
#[inline]
pub(crate) fn is_negative_sign(nibble: u8) -> bool {
    nibble == 0x0B || nibble == 0x0D
}

fn count_digits(mut value: u64) -> u32 {
    let mut count = 0;
    while value > 0 {
        count += 1;
        value /= 10;
    }
    count
}
