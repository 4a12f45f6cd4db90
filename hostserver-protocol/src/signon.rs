//! Signon server datastreams
//!
//! The signon server authenticates in two round trips:
//!
//! 1. **Exchange attributes** (0x7003): the client sends its version,
//!    datastream level and seed; the reply carries the server version and
//!    level, the server seed, the password level and the signon job name.
//! 2. **Signon info** (0x7004): the client sends its CCSID, the password
//!    substitute and the user ID, and may ask for host messages; the reply
//!    carries the server CCSID, signon dates, the invalid signon count and
//!    any messages.
//!
//! Both replies carry a return code at offset 20 followed by LL/CP fields.

use crate::codepoints::{
    CP_CLIENT_CCSID, CP_CLIENT_VERSION, CP_CURRENT_SIGNON_DATE, CP_DATASTREAM_LEVEL,
    CP_INVALID_SIGNON_COUNT, CP_JOB_NAME, CP_LAST_SIGNON_DATE, CP_MESSAGE, CP_MESSAGE_ID,
    CP_MESSAGE_SEVERITY, CP_MESSAGE_TEXT, CP_PASSWORD, CP_PASSWORD_EXPIRATION_DATE,
    CP_PASSWORD_LEVEL, CP_RETURN_MESSAGES, CP_SEED, CP_SERVER_CCSID, CP_USER_ID,
    REPLY_EXCHANGE_ATTRIBUTES, REPLY_SIGNON_INFO, REQ_EXCHANGE_ATTRIBUTES, REQ_SIGNON_INFO,
    SERVER_SIGNON,
};
use crate::error::{DataStreamException, HostServerResult};
use crate::llcp::{LlcpField, LlcpFields};
use crate::reply::{Reply, read_reply};
use crate::request::RequestBuilder;
use crate::return_codes::return_code_error;
use bytes::Bytes;
use hostserver_codec::Codec;
use hostserver_core::{Message, SystemInfo};
use hostserver_security::{Seed, UserId};
use hostserver_transport::{DataStreamReader, DataStreamWriter};
use std::io::{Read, Write};

const EXCHANGE_ATTRIBUTES_STREAM: &str = "SignonExchangeAttributesReply";
const SIGNON_INFO_STREAM: &str = "SignonInfoReply";

/// Client version sent in the exchange attributes request
pub const CLIENT_VERSION: u32 = 1;
/// Datastream level sent when the caller does not choose one
pub const DEFAULT_DATASTREAM_LEVEL: u16 = 5;
/// Lowest server level that can return structured messages
pub const MESSAGES_MIN_SERVER_LEVEL: u16 = 5;

/// Shortest valid signon reply: header plus return code
pub const SIGNON_REPLY_LENGTH: usize = 24;

const FIELDS_OFFSET: usize = 24;

/// Exchange attributes request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeAttributesRequest {
    pub client_version: u32,
    pub datastream_level: u16,
    pub client_seed: Seed,
}

impl ExchangeAttributesRequest {
    pub fn new(datastream_level: u16, client_seed: Seed) -> Self {
        Self {
            client_version: CLIENT_VERSION,
            datastream_level,
            client_seed,
        }
    }

    pub fn encode(&self) -> Bytes {
        RequestBuilder::new(SERVER_SIGNON, REQ_EXCHANGE_ATTRIBUTES)
            .field_u32(CP_CLIENT_VERSION, self.client_version)
            .field_u16(CP_DATASTREAM_LEVEL, self.datastream_level)
            .field(CP_SEED, &self.client_seed)
            .build()
    }
}

/// Exchange attributes reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeAttributesReply {
    pub server_version: u32,
    pub server_level: u16,
    pub server_seed: Seed,
    pub password_level: u8,
    pub job_name: String,
    pub server_ccsid: Option<u32>,
}

impl ExchangeAttributesReply {
    pub fn parse(reply: &Reply, codec: &Codec) -> HostServerResult<Self> {
        let rc = reply.return_code()?;
        if rc != 0 {
            return Err(return_code_error(EXCHANGE_ATTRIBUTES_STREAM, rc, Vec::new()));
        }

        let mut parsed = Self::default();
        let mut seed = None;
        for field in reply.fields(FIELDS_OFFSET) {
            let field = field?;
            match field.codepoint {
                CP_CLIENT_VERSION => parsed.server_version = field.u32()?,
                CP_DATASTREAM_LEVEL => parsed.server_level = field.u16()?,
                CP_SEED => seed = Some(field.bytes8()?),
                CP_PASSWORD_LEVEL => parsed.password_level = field.u8()?,
                CP_JOB_NAME => parsed.job_name = field.text(codec)?,
                CP_SERVER_CCSID => parsed.server_ccsid = Some(field.u32()?),
                _ => {}
            }
        }

        parsed.server_seed = seed.ok_or_else(|| {
            DataStreamException::bad_reply(EXCHANGE_ATTRIBUTES_STREAM, CP_SEED)
        })?;
        Ok(parsed)
    }

    /// System facts for `host` as reported by this reply
    pub fn system_info(&self, host: &str) -> SystemInfo {
        SystemInfo::new(
            host,
            self.server_version,
            self.server_level,
            self.server_ccsid.unwrap_or_default(),
            self.password_level,
            self.job_name.clone(),
        )
    }
}

/// Signon info request
#[derive(Debug, Clone)]
pub struct SignonInfoRequest<'a> {
    pub auth_scheme: u8,
    pub client_ccsid: u32,
    pub password: &'a [u8],
    pub user_id: &'a UserId,
    /// Level reported in the exchange attributes reply
    pub server_level: u16,
    pub request_messages: bool,
}

impl SignonInfoRequest<'_> {
    /// Whether the return-messages field goes into the request
    pub fn asks_for_messages(&self) -> bool {
        self.request_messages && self.server_level >= MESSAGES_MIN_SERVER_LEVEL
    }

    pub fn encode(&self) -> Bytes {
        let builder = RequestBuilder::new(SERVER_SIGNON, REQ_SIGNON_INFO)
            .template(&[self.auth_scheme])
            .field_u32(CP_CLIENT_CCSID, self.client_ccsid)
            .field(CP_PASSWORD, self.password)
            .field(CP_USER_ID, self.user_id);
        if self.asks_for_messages() {
            builder.field_u8(CP_RETURN_MESSAGES, 0x01).build()
        } else {
            builder.build()
        }
    }
}

/// Signon info reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignonInfoReply {
    pub server_ccsid: Option<u32>,
    /// Raw 8-byte host timestamps
    pub current_signon_date: Option<[u8; 8]>,
    pub last_signon_date: Option<[u8; 8]>,
    pub password_expiration_date: Option<[u8; 8]>,
    pub invalid_signon_count: Option<u16>,
    pub messages: Vec<Message>,
}

impl SignonInfoReply {
    /// Parse the reply; a non-zero return code becomes an error that
    /// carries the messages found in the reply
    pub fn parse(reply: &Reply, codec: &Codec) -> HostServerResult<Self> {
        let rc = reply.return_code()?;
        if rc != 0 {
            return Err(return_code_error(SIGNON_INFO_STREAM, rc, host_messages(reply, codec)));
        }

        let mut parsed = Self::default();
        for field in reply.fields(FIELDS_OFFSET) {
            let field = field?;
            match field.codepoint {
                CP_SERVER_CCSID => parsed.server_ccsid = Some(field.u32()?),
                CP_CURRENT_SIGNON_DATE => parsed.current_signon_date = Some(field.bytes8()?),
                CP_LAST_SIGNON_DATE => parsed.last_signon_date = Some(field.bytes8()?),
                CP_PASSWORD_EXPIRATION_DATE => {
                    parsed.password_expiration_date = Some(field.bytes8()?)
                }
                CP_INVALID_SIGNON_COUNT => parsed.invalid_signon_count = Some(field.u16()?),
                CP_MESSAGE => parsed.messages.push(parse_message(&field, codec)?),
                _ => {}
            }
        }

        Ok(parsed)
    }
}

/// Messages of a failed signon, up to the first malformed field
fn host_messages(reply: &Reply, codec: &Codec) -> Vec<Message> {
    reply
        .fields(FIELDS_OFFSET)
        .map_while(Result::ok)
        .filter(|field| field.codepoint == CP_MESSAGE)
        .filter_map(|field| parse_message(&field, codec).ok())
        .collect()
}

fn parse_message(field: &LlcpField<'_>, codec: &Codec) -> HostServerResult<Message> {
    let mut message = Message::new("", "", 0);
    for inner in LlcpFields::new(SIGNON_INFO_STREAM, field.data) {
        let inner = inner?;
        match inner.codepoint {
            CP_MESSAGE_ID => message.id = inner.text(codec)?,
            CP_MESSAGE_TEXT => message.text = inner.text(codec)?,
            CP_MESSAGE_SEVERITY => {
                message.severity = u8::try_from(inner.u16()?).unwrap_or(u8::MAX)
            }
            _ => {}
        }
    }
    Ok(message)
}

/// Run the exchange attributes round trip
pub fn exchange_attributes<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    request: &ExchangeAttributesRequest,
    codec: &Codec,
) -> HostServerResult<ExchangeAttributesReply> {
    log::debug!("Exchanging signon attributes");
    writer.send(&request.encode())?;
    let reply = read_reply(
        reader,
        EXCHANGE_ATTRIBUTES_STREAM,
        REPLY_EXCHANGE_ATTRIBUTES,
        SIGNON_REPLY_LENGTH,
    )?;
    let parsed = ExchangeAttributesReply::parse(&reply, codec)?;
    log::debug!(
        "Signon server version 0x{:08X}, level {}, password level {}",
        parsed.server_version,
        parsed.server_level,
        parsed.password_level
    );
    Ok(parsed)
}

/// Run the signon info round trip
pub fn signon_info<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    request: &SignonInfoRequest<'_>,
    codec: &Codec,
) -> HostServerResult<SignonInfoReply> {
    log::debug!("Sending signon info");
    writer.send(&request.encode())?;
    let reply = read_reply(reader, SIGNON_INFO_STREAM, REPLY_SIGNON_INFO, SIGNON_REPLY_LENGTH)?;
    SignonInfoReply::parse(&reply, codec)
}
