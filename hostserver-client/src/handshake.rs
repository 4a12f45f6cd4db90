//! Handshakes that turn a bare socket into an authenticated connection
//!
//! Both variants start from a fresh client seed and end with an 8-byte
//! password substitute computed from the user ID, password and both seeds.
//!
//! - [`signon`]: exchange attributes, then signon info, against the signon
//!   server. Produces the host's [`SystemInfo`].
//! - [`start_service`]: seed exchange, then start server, against any other
//!   service. Needs the password level from an earlier signon.

use crate::config::ConnectionConfig;
use crate::error::HostServerResult;
use crate::service::Service;
use hostserver_codec::Codec;
use hostserver_core::SystemInfo;
use hostserver_protocol::{
    ExchangeAttributesRequest, SignonInfoReply, SignonInfoRequest, StartServerRequest,
    exchange_attributes, exchange_seeds, signon_info, start_server,
};
use hostserver_security::{
    PasswordEncryption, check_password_level, client_seed, encode_password, encode_user_id,
    encrypt_password,
};
use hostserver_transport::{DataStreamReader, DataStreamWriter};
use std::io::{Read, Write};

/// User ID and password for one handshake
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Result of a signon handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignonOutcome {
    /// Host facts with the CCSID from the signon info reply folded in
    pub info: SystemInfo,
    pub reply: SignonInfoReply,
}

/// Authenticate against the signon server
pub fn signon<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    config: &ConnectionConfig,
    credentials: Credentials<'_>,
    codec: &Codec,
) -> HostServerResult<SignonOutcome> {
    let user_id = encode_user_id(codec, credentials.user)?;
    let password = encode_password(codec, credentials.password)?;
    let seed = client_seed();

    let attributes = exchange_attributes(
        reader,
        writer,
        &ExchangeAttributesRequest::new(config.datastream_level, seed),
        codec,
    )?;
    let info = attributes.system_info(&config.host);

    let substitute = encrypt_password(
        &user_id,
        &password,
        &seed,
        &attributes.server_seed,
        info.password_level,
    )?;
    let request = SignonInfoRequest {
        auth_scheme: PasswordEncryption::for_level(info.password_level).auth_scheme(),
        client_ccsid: config.client_ccsid,
        password: &substitute,
        user_id: &user_id,
        server_level: info.server_level,
        request_messages: config.request_messages,
    };
    let reply = signon_info(reader, writer, &request, codec)?;

    let info = match reply.server_ccsid {
        Some(ccsid) => info.with_server_ccsid(ccsid),
        None => info,
    };
    log::debug!(
        "Signed on to {} ({}) as {}",
        info.host,
        info.release_string(),
        credentials.user
    );
    Ok(SignonOutcome { info, reply })
}

/// Authenticate against a non-signon service; returns the job name
pub fn start_service<R: Read, W: Write>(
    reader: &mut DataStreamReader<R>,
    writer: &mut DataStreamWriter<W>,
    service: Service,
    info: &SystemInfo,
    credentials: Credentials<'_>,
    codec: &Codec,
) -> HostServerResult<String> {
    check_password_level(info.password_level)?;
    let user_id = encode_user_id(codec, credentials.user)?;
    let password = encode_password(codec, credentials.password)?;
    let seed = client_seed();

    let server_seed = exchange_seeds(reader, writer, service.server_id(), &seed)?;
    let substitute =
        encrypt_password(&user_id, &password, &seed, &server_seed, info.password_level)?;
    let request = StartServerRequest {
        server_id: service.server_id(),
        auth_scheme: PasswordEncryption::for_level(info.password_level).auth_scheme(),
        password: &substitute,
        user_id: &user_id,
    };
    let reply = start_server(reader, writer, &request, codec)?;
    Ok(reply.job_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostServerError;
    use hostserver_protocol::RequestBuilder;
    use hostserver_protocol::codepoints::{
        CP_CLIENT_VERSION, CP_DATASTREAM_LEVEL, CP_JOB_NAME, CP_PASSWORD_LEVEL, CP_SEED,
        CP_SERVER_CCSID, REPLY_EXCHANGE_ATTRIBUTES, REPLY_EXCHANGE_SEEDS, REPLY_SIGNON_INFO,
        REPLY_START_SERVER, SERVER_SIGNON,
    };
    use std::io::Cursor;

    fn job_name(name: &str) -> Vec<u8> {
        let mut data = 37u32.to_be_bytes().to_vec();
        data.extend(Codec::new().text_to_ebcdic37(name));
        data
    }

    fn attributes_reply(password_level: u8) -> Vec<u8> {
        RequestBuilder::new(SERVER_SIGNON, REPLY_EXCHANGE_ATTRIBUTES)
            .template(&0u32.to_be_bytes())
            .field_u32(CP_CLIENT_VERSION, 0x0007_0400)
            .field_u16(CP_DATASTREAM_LEVEL, 10)
            .field(CP_SEED, &[0x11; 8])
            .field_u8(CP_PASSWORD_LEVEL, password_level)
            .field(CP_JOB_NAME, &job_name("111111/QUSER/QZSOSIGN"))
            .build()
            .to_vec()
    }

    fn signon_reply() -> Vec<u8> {
        RequestBuilder::new(SERVER_SIGNON, REPLY_SIGNON_INFO)
            .template(&0u32.to_be_bytes())
            .field_u32(CP_SERVER_CCSID, 273)
            .build()
            .to_vec()
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            host: "myhost".to_string(),
            ..ConnectionConfig::default()
        }
    }

    const CREDENTIALS: Credentials<'static> = Credentials {
        user: "qsecofr",
        password: "secret",
    };

    #[test]
    fn test_signon_folds_in_ccsid() {
        let mut replies = attributes_reply(0);
        replies.extend(signon_reply());
        let mut reader = DataStreamReader::new(Cursor::new(replies));
        let mut writer = DataStreamWriter::new(Vec::new());

        let outcome =
            signon(&mut reader, &mut writer, &config(), CREDENTIALS, &Codec::new()).unwrap();
        assert_eq!(outcome.info.host, "myhost");
        assert_eq!(outcome.info.release_string(), "V7R4M0");
        assert_eq!(outcome.info.server_ccsid, 273);
        assert_eq!(outcome.info.signon_job_name, "111111/QUSER/QZSOSIGN");

        // exchange attributes (52 bytes) then signon info with the message request
        let sent = writer.into_inner().unwrap();
        assert_eq!(&sent[18..20], &[0x70, 0x03]);
        assert_eq!(&sent[52 + 18..52 + 20], &[0x70, 0x04]);
        assert_eq!(&sent[sent.len() - 3..], &[0x11, 0x28, 0x01]);
    }

    #[test]
    fn test_signon_sha_fails_before_signon_info() {
        let mut reader = DataStreamReader::new(Cursor::new(attributes_reply(2)));
        let mut writer = DataStreamWriter::new(Vec::new());

        let result = signon(&mut reader, &mut writer, &config(), CREDENTIALS, &Codec::new());
        assert!(matches!(result, Err(HostServerError::Security(_))));
        assert_eq!(writer.into_inner().unwrap().len(), 52);
    }

    #[test]
    fn test_start_service() {
        let mut replies = RequestBuilder::new(0xE008, REPLY_EXCHANGE_SEEDS)
            .template(&[0, 0, 0, 0, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28])
            .build()
            .to_vec();
        replies.extend(
            RequestBuilder::new(0xE008, REPLY_START_SERVER)
                .template(&0u32.to_be_bytes())
                .field(CP_JOB_NAME, &job_name("222222/QUSER/QZRCSRVS"))
                .build()
                .to_vec(),
        );
        let mut reader = DataStreamReader::new(Cursor::new(replies));
        let mut writer = DataStreamWriter::new(Vec::new());
        let info = SystemInfo::new("myhost", 0x0007_0400, 10, 37, 0, "111111/QUSER/QZSOSIGN");

        let job = start_service(
            &mut reader,
            &mut writer,
            Service::RemoteCommand,
            &info,
            CREDENTIALS,
            &Codec::new(),
        )
        .unwrap();
        assert_eq!(job, "222222/QUSER/QZRCSRVS");

        let sent = writer.into_inner().unwrap();
        assert_eq!(sent.len(), 28 + 52);
        assert_eq!(&sent[28 + 20..28 + 22], &[0x01, 0x01]);
    }

    #[test]
    fn test_start_service_sha_sends_nothing() {
        let mut reader = DataStreamReader::new(Cursor::new(Vec::new()));
        let mut writer = DataStreamWriter::new(Vec::new());
        let info = SystemInfo::new("myhost", 0x0007_0500, 10, 37, 3, "111111/QUSER/QZSOSIGN");

        let result = start_service(
            &mut reader,
            &mut writer,
            Service::File,
            &info,
            CREDENTIALS,
            &Codec::new(),
        );
        assert!(matches!(result, Err(HostServerError::Security(_))));
        assert!(writer.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_credentials_send_nothing() {
        let mut reader = DataStreamReader::new(Cursor::new(Vec::new()));
        let mut writer = DataStreamWriter::new(Vec::new());
        let credentials = Credentials {
            user: "much_too_long_user",
            password: "secret",
        };
        let result = signon(&mut reader, &mut writer, &config(), credentials, &Codec::new());
        assert!(matches!(result, Err(HostServerError::Security(_))));
        assert!(writer.into_inner().unwrap().is_empty());
    }
}
