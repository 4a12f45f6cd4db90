//! End job (request 0x1004)
//!
//! A bare header with no template. The server ends the job and closes the
//! socket without replying.

use crate::codepoints::REQ_END_JOB;
use crate::error::HostServerResult;
use crate::request::RequestBuilder;
use bytes::Bytes;
use hostserver_transport::DataStreamWriter;
use std::io::Write;

pub fn end_job_request(server_id: u16) -> Bytes {
    RequestBuilder::new(server_id, REQ_END_JOB).build()
}

pub fn send_end_job<W: Write>(writer: &mut DataStreamWriter<W>, server_id: u16) -> HostServerResult<()> {
    log::debug!("Ending job on server 0x{:04X}", server_id);
    writer.send(&end_job_request(server_id))
}
