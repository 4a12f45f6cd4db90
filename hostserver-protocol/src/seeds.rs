//! Seed exchange (request 0x7001)
//!
//! Request: header with client attributes `0x01`, then the 8-byte client
//! seed as the template. Reply: return code at offset 20 and the 8-byte
//! server seed at offset 24.

use crate::codepoints::{REPLY_EXCHANGE_SEEDS, REQ_EXCHANGE_SEEDS};
use crate::error::{DataStreamException, HostServerResult};
use crate::reply::{Reply, read_reply};
use crate::request::RequestBuilder;
use bytes::Bytes;
use hostserver_security::Seed;
use hostserver_transport::{DataStreamReader, DataStreamWriter};
use std::io::{Read, Write};

const STREAM: &str = "ExchangeSeedsReply";

/// Shortest valid seed exchange reply
pub const EXCHANGE_SEEDS_REPLY_LENGTH: usize = 32;

const CLIENT_ATTRIBUTES: u8 = 0x01;
const SERVER_SEED_OFFSET: usize = 24;

pub fn exchange_seeds_request(server_id: u16, client_seed: &Seed) -> Bytes {
    RequestBuilder::new(server_id, REQ_EXCHANGE_SEEDS)
        .client_attributes(CLIENT_ATTRIBUTES)
        .template(client_seed)
        .build()
}

/// Server seed from a seed exchange reply
pub fn parse_exchange_seeds_reply(reply: &Reply) -> HostServerResult<Seed> {
    let rc = reply.return_code()?;
    if rc != 0 {
        return Err(DataStreamException::bad_return_code(STREAM, rc).into());
    }
    reply
        .bytes
        .get(SERVER_SEED_OFFSET..SERVER_SEED_OFFSET + 8)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| DataStreamException::bad_length(STREAM, reply.bytes.len() as u64).into())
}

/// Send the client seed and return the server seed
pub fn exchange_seeds<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    server_id: u16,
    client_seed: &Seed,
) -> HostServerResult<Seed> {
    log::debug!("Exchanging seeds with server 0x{:04X}", server_id);
    writer.send(&exchange_seeds_request(server_id, client_seed))?;
    let reply = read_reply(reader, STREAM, REPLY_EXCHANGE_SEEDS, EXCHANGE_SEEDS_REPLY_LENGTH)?;
    parse_exchange_seeds_reply(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataStreamErrorKind, HostServerError};
    use std::io::Cursor;

    const SERVER_SEED: Seed = [0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18];

    fn reply(rc: u32, seed: &[u8]) -> Vec<u8> {
        let mut template = rc.to_be_bytes().to_vec();
        template.extend_from_slice(seed);
        RequestBuilder::new(0xE008, REPLY_EXCHANGE_SEEDS)
            .template(&template)
            .build()
            .to_vec()
    }

    #[test]
    fn test_request_layout() {
        let request = exchange_seeds_request(0xE008, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            request.as_ref(),
            &[
                0x00, 0x00, 0x00, 0x1C, 0x01, 0x00, 0xE0, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x08,
                0x70, 0x01, 1, 2, 3, 4, 5, 6, 7, 8
            ]
        );
    }

    #[test]
    fn test_exchange_seeds() {
        let mut reader = DataStreamReader::new(Cursor::new(reply(0, &SERVER_SEED)));
        let mut writer = DataStreamWriter::new(Vec::new());
        let seed = exchange_seeds(&mut reader, &mut writer, 0xE008, &[9; 8]).unwrap();
        assert_eq!(seed, SERVER_SEED);
        assert_eq!(writer.into_inner().unwrap().len(), 28);
    }

    #[test]
    fn test_non_zero_return_code() {
        let mut reader = DataStreamReader::new(Cursor::new(reply(0x0001_0001, &SERVER_SEED)));
        let mut writer = DataStreamWriter::new(Vec::new());
        match exchange_seeds(&mut reader, &mut writer, 0xE008, &[9; 8]) {
            Err(HostServerError::DataStream(e)) => {
                assert!(matches!(
                    e.kind,
                    DataStreamErrorKind::BadReturnCode { code: 0x0001_0001, .. }
                ))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_short_reply() {
        let mut reader = DataStreamReader::new(Cursor::new(reply(0, &SERVER_SEED[..4])));
        let mut writer = DataStreamWriter::new(Vec::new());
        assert!(matches!(
            exchange_seeds(&mut reader, &mut writer, 0xE008, &[9; 8]),
            Err(HostServerError::DataStream(_))
        ));
    }
}
