//! Decimal floating point (DECFLOAT(16) and DECFLOAT(34))
//!
//! Layout, most significant bit first: sign (1 bit), combination field
//! (5 bits), exponent continuation, then the coefficient continuation as
//! 10-bit densely packed declets of three digits each.

use crate::error::{HostServerError, HostServerResult};

struct DecFloatFormat {
    bytes: usize,
    exponent_continuation_bits: u32,
    declets: u32,
    bias: i32,
}

const DECFLOAT16: DecFloatFormat = DecFloatFormat {
    bytes: 8,
    exponent_continuation_bits: 8,
    declets: 5,
    bias: 398,
};

const DECFLOAT34: DecFloatFormat = DecFloatFormat {
    bytes: 16,
    exponent_continuation_bits: 12,
    declets: 11,
    bias: 6176,
};

const COMBINATION_NAN: u8 = 0b11111;
const COMBINATION_INFINITY: u8 = 0b11110;

/// Decode the first 8 bytes of `bytes` as DECFLOAT(16)
pub fn decfloat16_to_string(bytes: &[u8]) -> HostServerResult<String> {
    decode(bytes, &DECFLOAT16)
}

/// Decode the first 16 bytes of `bytes` as DECFLOAT(34)
pub fn decfloat34_to_string(bytes: &[u8]) -> HostServerResult<String> {
    decode(bytes, &DECFLOAT34)
}

fn decode(bytes: &[u8], format: &DecFloatFormat) -> HostServerResult<String> {
    let field = bytes.get(..format.bytes).ok_or_else(|| {
        HostServerError::InvalidData(format!(
            "decimal float needs {} byte(s), got {}",
            format.bytes,
            bytes.len()
        ))
    })?;
    let bits = field
        .iter()
        .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
    let width = format.bytes as u32 * 8;

    let negative = (bits >> (width - 1)) & 1 == 1;
    let combination = ((bits >> (width - 6)) & 0x1F) as u8;

    match combination {
        COMBINATION_NAN => {
            let signaling = (bits >> (width - 7)) & 1 == 1;
            let name = if signaling { "SNaN" } else { "NaN" };
            return Ok(if negative {
                format!("-{}", name)
            } else {
                name.to_string()
            });
        }
        COMBINATION_INFINITY => {
            return Ok(if negative { "-Infinity" } else { "Infinity" }.to_string());
        }
        _ => {}
    }

    let (exponent_msb, leading_digit) = if combination >> 3 == 0b11 {
        ((combination >> 1) & 0b11, 8 + (combination & 1))
    } else {
        (combination >> 3, combination & 0b111)
    };

    let coefficient_bits = format.declets * 10;
    let continuation_mask = (1u128 << format.exponent_continuation_bits) - 1;
    let continuation = ((bits >> coefficient_bits) & continuation_mask) as i32;
    let exponent = ((i32::from(exponent_msb) << format.exponent_continuation_bits) | continuation)
        - format.bias;

    let declets: Vec<u16> = (0..format.declets)
        .rev()
        .map(|i| decode_declet(((bits >> (i * 10)) & 0x3FF) as u16))
        .collect();

    // Three declets at a time (up to 10^9) keep the accumulator steps small
    let mut coefficient = u128::from(leading_digit);
    for group in declets.chunks(3) {
        let (scale, value) = group
            .iter()
            .fold((1u128, 0u128), |(scale, value), &d| {
                (scale * 1000, value * 1000 + u128::from(d))
            });
        coefficient = coefficient * scale + value;
    }

    Ok(render(negative, coefficient, exponent))
}

/// Decode one densely packed declet (bits b9..b0) into 0..=999
fn decode_declet(declet: u16) -> u16 {
    let bit = |n: u32| (declet >> n) & 1;
    let high = (declet >> 7) & 0b111;
    let middle = (declet >> 4) & 0b111;

    let (d2, d1, d0) = if bit(3) == 0 {
        (high, middle, declet & 0b111)
    } else {
        match (declet >> 1) & 0b11 {
            0b00 => (high, middle, 8 + bit(0)),
            0b01 => (high, 8 + bit(4), (bit(6) << 2) | (bit(5) << 1) | bit(0)),
            0b10 => (8 + bit(7), middle, (bit(9) << 2) | (bit(8) << 1) | bit(0)),
            _ => match (declet >> 5) & 0b11 {
                0b00 => (8 + bit(7), 8 + bit(4), (bit(9) << 2) | (bit(8) << 1) | bit(0)),
                0b01 => (8 + bit(7), (bit(9) << 2) | (bit(8) << 1) | bit(4), 8 + bit(0)),
                0b10 => (high, 8 + bit(4), 8 + bit(0)),
                _ => (8 + bit(7), 8 + bit(4), 8 + bit(0)),
            },
        }
    };
    d2 * 100 + d1 * 10 + d0
}

/// Plain notation: `coefficient * 10^exponent` without an exponent marker
fn render(negative: bool, coefficient: u128, exponent: i32) -> String {
    let digits = coefficient.to_string();
    let mut text = String::with_capacity(digits.len() + 8);
    if negative && coefficient != 0 {
        text.push('-');
    }

    if exponent >= 0 {
        text.push_str(&digits);
        if coefficient != 0 {
            text.extend(std::iter::repeat_n('0', exponent as usize));
        }
    } else {
        let scale = exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            text.push_str(int_part);
            text.push('.');
            text.push_str(frac_part);
        } else {
            text.push_str("0.");
            text.extend(std::iter::repeat_n('0', scale - digits.len()));
            text.push_str(&digits);
        }
    }
    text
}
