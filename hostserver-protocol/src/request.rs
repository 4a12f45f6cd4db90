//! Request assembly

use crate::header::{HEADER_LENGTH, Header};
use crate::llcp::put_field;
use bytes::{BufMut, Bytes, BytesMut};

/// Builds one request: header, fixed template, then LL/CP fields
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    header: Header,
    template: BytesMut,
    fields: BytesMut,
}

impl RequestBuilder {
    pub fn new(server_id: u16, request_id: u16) -> Self {
        Self {
            header: Header::request(server_id, 0, request_id),
            template: BytesMut::new(),
            fields: BytesMut::new(),
        }
    }

    pub fn client_attributes(mut self, attributes: u8) -> Self {
        self.header.client_attributes = attributes;
        self
    }

    pub fn correlation_id(mut self, correlation_id: u32) -> Self {
        self.header.correlation_id = correlation_id;
        self
    }

    /// Append bytes to the template
    pub fn template(mut self, bytes: &[u8]) -> Self {
        self.template.put_slice(bytes);
        self
    }

    pub fn field(mut self, codepoint: u16, data: &[u8]) -> Self {
        put_field(&mut self.fields, codepoint, data);
        self
    }

    pub fn field_u8(self, codepoint: u16, value: u8) -> Self {
        self.field(codepoint, &[value])
    }

    pub fn field_u16(self, codepoint: u16, value: u16) -> Self {
        self.field(codepoint, &value.to_be_bytes())
    }

    pub fn field_u32(self, codepoint: u16, value: u32) -> Self {
        self.field(codepoint, &value.to_be_bytes())
    }

    pub fn build(mut self) -> Bytes {
        let length = HEADER_LENGTH + self.template.len() + self.fields.len();
        self.header.length = length as u32;
        self.header.template_length = self.template.len() as u16;

        let mut buf = BytesMut::with_capacity(length);
        self.header.encode_into(&mut buf);
        buf.put_slice(&self.template);
        buf.put_slice(&self.fields);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sets_lengths() {
        let request = RequestBuilder::new(0xE009, 0x7004)
            .template(&[0x01])
            .field_u32(0x1113, 1200)
            .build();
        assert_eq!(request.len(), 31);
        let header = Header::decode(&request).unwrap();
        assert_eq!(header.length, 31);
        assert_eq!(header.template_length, 1);
        assert_eq!(header.request_reply_id, 0x7004);
        assert_eq!(request[20], 0x01);
        assert_eq!(&request[21..], &[0, 0, 0, 10, 0x11, 0x13, 0, 0, 0x04, 0xB0]);
    }
}
