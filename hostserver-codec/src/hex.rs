//! Hex conversion for diagnostics and trace output

use crate::error::{HostServerError, HostServerResult};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render bytes as contiguous uppercase hex, e.g. `[0x0A, 0xFF]` → `"0AFF"`
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        push_byte(&mut text, b);
    }
    text
}

/// Render bytes as uppercase hex pairs separated by single spaces
pub fn hex_dump_line(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        push_byte(&mut text, b);
    }
    text
}

/// Parse a hex string; an odd-length string has an implied leading `0`
pub fn hex_to_bytes(text: &str) -> HostServerResult<Vec<u8>> {
    let nibbles = text
        .chars()
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or(HostServerError::InvalidDigit(c))
        })
        .collect::<HostServerResult<Vec<u8>>>()?;

    let mut bytes = Vec::with_capacity(nibbles.len().div_ceil(2));
    let rest = if nibbles.len() % 2 == 1 {
        bytes.push(nibbles[0]);
        &nibbles[1..]
    } else {
        &nibbles[..]
    };
    bytes.extend(rest.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]));
    Ok(bytes)
}

#[inline]
fn push_byte(text: &mut String, b: u8) {
    text.push(HEX_DIGITS[(b >> 4) as usize] as char);
    text.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
}
