//! Fixed-width big-endian integer and float codecs
//!
//! Every reader takes the buffer and an offset and fails with
//! `InvalidData` when the field would run past the end of the buffer.
//! Floats are the IEEE bit patterns of the same-width unsigned integers.

use crate::error::{HostServerError, HostServerResult};

fn field<const N: usize>(bytes: &[u8], offset: usize) -> HostServerResult<[u8; N]> {
    bytes
        .get(offset..offset.saturating_add(N))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| out_of_range(N, offset, bytes.len()))
}

fn put<const N: usize>(out: &mut [u8], offset: usize, value: [u8; N]) -> HostServerResult<()> {
    let available = out.len();
    out.get_mut(offset..offset.saturating_add(N))
        .ok_or_else(|| out_of_range(N, offset, available))?
        .copy_from_slice(&value);
    Ok(())
}

fn out_of_range(length: usize, offset: usize, available: usize) -> HostServerError {
    HostServerError::InvalidData(format!(
        "{} byte field at offset {} exceeds buffer of {} byte(s)",
        length, offset, available
    ))
}

pub fn read_u16(bytes: &[u8], offset: usize) -> HostServerResult<u16> {
    field(bytes, offset).map(u16::from_be_bytes)
}

pub fn read_i16(bytes: &[u8], offset: usize) -> HostServerResult<i16> {
    field(bytes, offset).map(i16::from_be_bytes)
}

pub fn read_u32(bytes: &[u8], offset: usize) -> HostServerResult<u32> {
    field(bytes, offset).map(u32::from_be_bytes)
}

pub fn read_i32(bytes: &[u8], offset: usize) -> HostServerResult<i32> {
    field(bytes, offset).map(i32::from_be_bytes)
}

pub fn read_u64(bytes: &[u8], offset: usize) -> HostServerResult<u64> {
    field(bytes, offset).map(u64::from_be_bytes)
}

pub fn read_i64(bytes: &[u8], offset: usize) -> HostServerResult<i64> {
    field(bytes, offset).map(i64::from_be_bytes)
}

pub fn read_f32(bytes: &[u8], offset: usize) -> HostServerResult<f32> {
    read_u32(bytes, offset).map(f32::from_bits)
}

pub fn read_f64(bytes: &[u8], offset: usize) -> HostServerResult<f64> {
    read_u64(bytes, offset).map(f64::from_bits)
}

pub fn write_u16(out: &mut [u8], offset: usize, value: u16) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_i16(out: &mut [u8], offset: usize, value: i16) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_u32(out: &mut [u8], offset: usize, value: u32) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_i32(out: &mut [u8], offset: usize, value: i32) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_u64(out: &mut [u8], offset: usize, value: u64) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_i64(out: &mut [u8], offset: usize, value: i64) -> HostServerResult<()> {
    put(out, offset, value.to_be_bytes())
}

pub fn write_f32(out: &mut [u8], offset: usize, value: f32) -> HostServerResult<()> {
    write_u32(out, offset, value.to_bits())
}

pub fn write_f64(out: &mut [u8], offset: usize, value: f64) -> HostServerResult<()> {
    write_u64(out, offset, value.to_bits())
}
