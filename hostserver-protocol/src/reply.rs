//! Reply framing

use crate::error::{DataStreamException, HostServerResult};
use crate::header::{HEADER_LENGTH, Header};
use crate::llcp::LlcpFields;
use hostserver_codec::binary;
use hostserver_transport::DataStreamReader;
use std::io::Read;

/// Largest reply accepted before any allocation
pub const MAX_REPLY_LENGTH: u32 = 16 * 1024 * 1024;

/// One complete reply, header included
#[derive(Debug, Clone)]
pub struct Reply {
    pub stream: &'static str,
    pub header: Header,
    pub bytes: Vec<u8>,
}

impl Reply {
    /// Parse a reply that is already in memory
    pub fn parse(
        stream: &'static str,
        bytes: Vec<u8>,
        expected_reply_id: u16,
        min_length: usize,
    ) -> HostServerResult<Self> {
        let length = binary::read_u32(&bytes, 0)
            .map_err(|_| DataStreamException::bad_length(stream, bytes.len() as u64))?;
        check_length(stream, length, min_length)?;
        if length as usize != bytes.len() {
            return Err(DataStreamException::bad_length(stream, u64::from(length)).into());
        }
        Self::from_frame(stream, bytes, expected_reply_id)
    }

    fn from_frame(
        stream: &'static str,
        bytes: Vec<u8>,
        expected_reply_id: u16,
    ) -> HostServerResult<Self> {
        let header = Header::decode(&bytes)?;
        if header.request_reply_id != expected_reply_id {
            return Err(DataStreamException::bad_reply(stream, header.request_reply_id).into());
        }
        Ok(Self {
            stream,
            header,
            bytes,
        })
    }

    /// Four-byte return code that follows the header
    pub fn return_code(&self) -> HostServerResult<u32> {
        binary::read_u32(&self.bytes, HEADER_LENGTH)
            .map_err(|_| DataStreamException::bad_length(self.stream, self.bytes.len() as u64).into())
    }

    /// LL/CP fields starting at `offset`
    pub fn fields(&self, offset: usize) -> LlcpFields<'_> {
        LlcpFields::new(self.stream, self.bytes.get(offset..).unwrap_or_default())
    }
}

/// Read one reply from `reader`
///
/// The total length is checked against `min_length` before anything else
/// is read; the reply ID is checked once the whole reply is in.
pub fn read_reply<R: Read>(
    reader: &mut DataStreamReader<R>,
    stream: &'static str,
    expected_reply_id: u16,
    min_length: usize,
) -> HostServerResult<Reply> {
    let length = reader.read_u32()?;
    if let Err(e) = check_length(stream, length, min_length) {
        reader.end();
        return Err(e);
    }

    let mut bytes = vec![0u8; length as usize];
    bytes[..4].copy_from_slice(&length.to_be_bytes());
    reader.read_fully(&mut bytes[4..])?;
    reader.end();

    Reply::from_frame(stream, bytes, expected_reply_id)
}

fn check_length(stream: &'static str, length: u32, min_length: usize) -> HostServerResult<()> {
    let min_length = min_length.max(HEADER_LENGTH);
    if (length as usize) < min_length || length > MAX_REPLY_LENGTH {
        return Err(DataStreamException::bad_length(stream, u64::from(length)).into());
    }
    Ok(())
}
