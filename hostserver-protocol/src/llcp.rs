//! LL/CP fields
//!
//! Each field is a 4-byte length `LL` (counting itself and the codepoint),
//! a 2-byte codepoint `CP` and `LL - 6` bytes of data. Reply parsers walk
//! the fields with [`LlcpFields`] and ignore codepoints they do not need.

use crate::error::{DataStreamException, HostServerResult};
use bytes::BufMut;
use hostserver_codec::{Codec, binary};

/// Length of the LL and CP prefix
pub const LLCP_HEADER_LENGTH: usize = 6;

/// One LL/CP field borrowed from a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlcpField<'a> {
    pub codepoint: u16,
    pub data: &'a [u8],
}

impl<'a> LlcpField<'a> {
    pub fn u8(&self) -> HostServerResult<u8> {
        self.data
            .first()
            .copied()
            .ok_or_else(|| self.too_short(1))
    }

    pub fn u16(&self) -> HostServerResult<u16> {
        binary::read_u16(self.data, 0).map_err(|_| self.too_short(2))
    }

    pub fn u32(&self) -> HostServerResult<u32> {
        binary::read_u32(self.data, 0).map_err(|_| self.too_short(4))
    }

    /// The first eight bytes as an array
    pub fn bytes8(&self) -> HostServerResult<[u8; 8]> {
        self.data
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| self.too_short(8))
    }

    /// Text prefixed by its 4-byte CCSID, trailing blanks removed
    ///
    /// Text in a CCSID without a converter is read as CCSID 37.
    pub fn text(&self, codec: &Codec) -> HostServerResult<String> {
        let ccsid = self.u32()?;
        let bytes = &self.data[4..];
        let text = codec
            .bytes_to_text(bytes, ccsid)
            .unwrap_or_else(|_| codec.ebcdic37_to_text(bytes));
        Ok(text
            .trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_string())
    }

    fn too_short(&self, needed: usize) -> crate::error::HostServerError {
        DataStreamException::bad_length(
            format!("LL/CP 0x{:04X} (needs {} byte(s))", self.codepoint, needed),
            (self.data.len() + LLCP_HEADER_LENGTH) as u64,
        )
        .into()
    }
}

/// Iterator over the LL/CP fields of a byte slice
///
/// A field whose length is below six or runs past the end of the slice
/// ends the iteration with a `BadLength` error.
#[derive(Debug, Clone)]
pub struct LlcpFields<'a> {
    stream: &'static str,
    data: &'a [u8],
    failed: bool,
}

impl<'a> LlcpFields<'a> {
    pub fn new(stream: &'static str, data: &'a [u8]) -> Self {
        Self {
            stream,
            data,
            failed: false,
        }
    }
}

impl<'a> Iterator for LlcpFields<'a> {
    type Item = HostServerResult<LlcpField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }
        let remaining = self.data.len();
        if remaining < LLCP_HEADER_LENGTH {
            self.failed = true;
            return Some(Err(
                DataStreamException::bad_length(self.stream, remaining as u64).into()
            ));
        }

        let ll = u32::from_be_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]);
        let length = ll as usize;
        if length < LLCP_HEADER_LENGTH || length > remaining {
            self.failed = true;
            return Some(Err(DataStreamException::bad_length(self.stream, u64::from(ll)).into()));
        }

        let codepoint = u16::from_be_bytes([self.data[4], self.data[5]]);
        let data = &self.data[LLCP_HEADER_LENGTH..length];
        self.data = &self.data[length..];
        Some(Ok(LlcpField { codepoint, data }))
    }
}

/// Append one LL/CP field
pub fn put_field<B: BufMut>(buf: &mut B, codepoint: u16, data: &[u8]) {
    buf.put_u32((LLCP_HEADER_LENGTH + data.len()) as u32);
    buf.put_u16(codepoint);
    buf.put_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataStreamErrorKind, HostServerError};

    fn fields(data: &[u8]) -> Vec<HostServerResult<LlcpField<'_>>> {
        LlcpFields::new("TestReply", data).collect()
    }

    #[test]
    fn test_iterate_and_skip_unknown() {
        let mut data = Vec::new();
        put_field(&mut data, 0x1119, &[0x01]);
        put_field(&mut data, 0x9999, &[0xAA, 0xBB, 0xCC]);
        put_field(&mut data, 0x1114, &[0x00, 0x00, 0x00, 0x25]);

        let parsed: Vec<LlcpField<'_>> = fields(&data).into_iter().map(Result::unwrap).collect();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].u8().unwrap(), 1);
        assert_eq!(parsed[1].data, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(parsed[2].u32().unwrap(), 37);
    }

    #[test]
    fn test_empty_field() {
        let data = [0x00, 0x00, 0x00, 0x06, 0x11, 0x28];
        let parsed = fields(&data);
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].as_ref().unwrap().data.is_empty());
    }

    #[test]
    fn test_length_below_minimum() {
        let data = [0x00, 0x00, 0x00, 0x05, 0x11, 0x28, 0x00];
        let parsed = fields(&data);
        assert_eq!(parsed.len(), 1);
        match &parsed[0] {
            Err(HostServerError::DataStream(e)) => assert_eq!(
                e.kind,
                DataStreamErrorKind::BadLength {
                    stream: "TestReply".to_string(),
                    length: 5
                }
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_length_past_end() {
        let data = [0x00, 0x00, 0x00, 0x0A, 0x11, 0x14, 0x00, 0x00];
        assert!(matches!(fields(&data)[0], Err(HostServerError::DataStream(_))));
    }

    #[test]
    fn test_trailing_garbage() {
        let mut data = Vec::new();
        put_field(&mut data, 0x1119, &[0x00]);
        data.extend_from_slice(&[0x00, 0x00]);
        let parsed = fields(&data);
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_ok());
        assert!(parsed[1].is_err());
    }

    #[test]
    fn test_short_field_accessors() {
        let field = LlcpField {
            codepoint: 0x1114,
            data: &[0x00, 0x25],
        };
        assert_eq!(field.u16().unwrap(), 37);
        assert!(matches!(field.u32(), Err(HostServerError::DataStream(_))));
        assert!(field.bytes8().is_err());
    }

    #[test]
    fn test_text_field() {
        let codec = Codec::new();
        let field = LlcpField {
            codepoint: 0x111F,
            data: &[0x00, 0x00, 0x00, 0x25, 0xD8, 0xE4, 0xE2, 0xC5, 0xD9, 0x40, 0x40],
        };
        assert_eq!(field.text(&codec).unwrap(), "QUSER");

        let unconverted = LlcpField {
            codepoint: 0x111F,
            data: &[0x00, 0x00, 0x01, 0x11, 0xC1],
        };
        assert_eq!(unconverted.text(&codec).unwrap(), "A");
    }
}
