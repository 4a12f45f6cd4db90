//! Handshake datastreams for the IBM i host server protocol
//!
//! This crate provides the 20-byte datastream header, LL/CP field handling,
//! reply framing and the request/reply pairs used to authenticate:
//!
//! - Seed exchange (`0x7001`) and start server (`0x7002`) for service ports
//! - Exchange attributes (`0x7003`) and signon info (`0x7004`) for the
//!   signon server
//! - End job (`0x1004`) sent before a connection is torn down
//!
//! Every round trip runs over a [`hostserver_transport::DataStreamReader`]
//! and [`hostserver_transport::DataStreamWriter`] pair, so it works the same
//! against a socket or an in-memory buffer.

pub mod codepoints;
pub mod end_job;
pub mod error;
pub mod header;
pub mod llcp;
pub mod reply;
pub mod request;
pub mod return_codes;
pub mod seeds;
pub mod signon;
pub mod start_server;

pub use end_job::{end_job_request, send_end_job};
pub use error::{DataStreamErrorKind, DataStreamException, HostServerError, HostServerResult};
pub use header::{HEADER_LENGTH, Header};
pub use llcp::{LLCP_HEADER_LENGTH, LlcpField, LlcpFields, put_field};
pub use reply::{MAX_REPLY_LENGTH, Reply, read_reply};
pub use request::RequestBuilder;
pub use return_codes::{lookup as lookup_return_code, return_code_error};
pub use seeds::{EXCHANGE_SEEDS_REPLY_LENGTH, exchange_seeds, exchange_seeds_request};
pub use signon::{
    DEFAULT_DATASTREAM_LEVEL, ExchangeAttributesReply, ExchangeAttributesRequest,
    SignonInfoReply, SignonInfoRequest, exchange_attributes, signon_info,
};
pub use start_server::{StartServerReply, StartServerRequest, start_server};
