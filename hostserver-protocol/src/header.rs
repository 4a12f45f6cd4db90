//! Datastream header
//!
//! # Layout (big endian)
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | total length, including these four bytes |
//! | 4 | 1 | client attributes |
//! | 5 | 1 | server attributes |
//! | 6 | 2 | server ID |
//! | 8 | 4 | CS instance |
//! | 12 | 4 | correlation ID |
//! | 16 | 2 | template length |
//! | 18 | 2 | request or reply ID |
//!
//! The template follows the header, then any LL/CP fields.

use crate::error::{HostServerError, HostServerResult};
use bytes::BufMut;

/// Header length
pub const HEADER_LENGTH: usize = 20;

/// Datastream header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub length: u32,
    pub client_attributes: u8,
    pub server_attributes: u8,
    pub server_id: u16,
    pub cs_instance: u32,
    pub correlation_id: u32,
    pub template_length: u16,
    pub request_reply_id: u16,
}

impl Header {
    /// Header of a request; `length` is filled in when the request is built
    pub fn request(server_id: u16, template_length: u16, request_id: u16) -> Self {
        Self {
            length: HEADER_LENGTH as u32,
            client_attributes: 0,
            server_attributes: 0,
            server_id,
            cs_instance: 0,
            correlation_id: 0,
            template_length,
            request_reply_id: request_id,
        }
    }

    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.length);
        buf.put_u8(self.client_attributes);
        buf.put_u8(self.server_attributes);
        buf.put_u16(self.server_id);
        buf.put_u32(self.cs_instance);
        buf.put_u32(self.correlation_id);
        buf.put_u16(self.template_length);
        buf.put_u16(self.request_reply_id);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LENGTH);
        self.encode_into(&mut out);
        out
    }

    /// Decode header from bytes
    pub fn decode(data: &[u8]) -> HostServerResult<Self> {
        if data.len() < HEADER_LENGTH {
            return Err(HostServerError::InvalidData(format!(
                "Datastream header too short: expected {}, got {}",
                HEADER_LENGTH,
                data.len()
            )));
        }
        Ok(Self {
            length: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            client_attributes: data[4],
            server_attributes: data[5],
            server_id: u16::from_be_bytes([data[6], data[7]]),
            cs_instance: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            correlation_id: u32::from_be_bytes([data[12], data[13], data[14], data[15]]),
            template_length: u16::from_be_bytes([data[16], data[17]]),
            request_reply_id: u16::from_be_bytes([data[18], data[19]]),
        })
    }
}
