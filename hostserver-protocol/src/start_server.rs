//! Start server (request 0x7002)
//!
//! The request template is two bytes: the authentication scheme and a
//! "send reply" flag. The password substitute (`0x1105`) and the EBCDIC
//! user ID (`0x1104`) follow as LL/CP fields. The reply carries a return
//! code at offset 20 and LL/CP fields from offset 24, among them the job
//! name (`0x111F`).

use crate::codepoints::{CP_JOB_NAME, CP_PASSWORD, CP_USER_ID, REPLY_START_SERVER, REQ_START_SERVER};
use crate::error::HostServerResult;
use crate::reply::{Reply, read_reply};
use crate::request::RequestBuilder;
use crate::return_codes::return_code_error;
use bytes::Bytes;
use hostserver_codec::Codec;
use hostserver_security::UserId;
use hostserver_transport::{DataStreamReader, DataStreamWriter};
use std::io::{Read, Write};

const STREAM: &str = "StartServerReply";

/// Shortest valid start server reply
pub const START_SERVER_REPLY_LENGTH: usize = 24;

const SEND_REPLY: u8 = 0x01;
const FIELDS_OFFSET: usize = 24;

/// Start server request
#[derive(Debug, Clone)]
pub struct StartServerRequest<'a> {
    pub server_id: u16,
    pub auth_scheme: u8,
    pub password: &'a [u8],
    pub user_id: &'a UserId,
}

impl StartServerRequest<'_> {
    pub fn encode(&self) -> Bytes {
        RequestBuilder::new(self.server_id, REQ_START_SERVER)
            .template(&[self.auth_scheme, SEND_REPLY])
            .field(CP_PASSWORD, self.password)
            .field(CP_USER_ID, self.user_id)
            .build()
    }
}

/// Start server reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartServerReply {
    pub job_name: String,
}

impl StartServerReply {
    pub fn parse(reply: &Reply, codec: &Codec) -> HostServerResult<Self> {
        let rc = reply.return_code()?;
        if rc != 0 {
            return Err(return_code_error(STREAM, rc, Vec::new()));
        }

        let mut parsed = Self::default();
        for field in reply.fields(FIELDS_OFFSET) {
            let field = field?;
            if field.codepoint == CP_JOB_NAME {
                parsed.job_name = field.text(codec)?;
            }
        }
        Ok(parsed)
    }
}

/// Send a start server request and parse the reply
pub fn start_server<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    request: &StartServerRequest<'_>,
    codec: &Codec,
) -> HostServerResult<StartServerReply> {
    log::debug!("Starting server 0x{:04X}", request.server_id);
    writer.send(&request.encode())?;
    let reply = read_reply(reader, STREAM, REPLY_START_SERVER, START_SERVER_REPLY_LENGTH)?;
    let parsed = StartServerReply::parse(&reply, codec)?;
    log::debug!("Server 0x{:04X} started job {}", request.server_id, parsed.job_name);
    Ok(parsed)
}
