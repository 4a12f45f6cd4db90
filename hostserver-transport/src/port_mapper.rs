//! Port mapper client
//!
//! The port mapper listens on port 449. A client sends the ASCII name of a
//! service (for example `as-signon`) and reads five bytes back: `0x2B`
//! followed by the big-endian port number.

use crate::error::{HostServerError, HostServerResult};
use crate::reader::DataStreamReader;
use crate::tcp::{TcpSettings, connect};
use crate::writer::DataStreamWriter;

/// Well-known port of the port mapper
pub const PORT_MAPPER_PORT: u16 = 449;

const REPLY_OK: u8 = 0x2B;

/// Ask the port mapper at `settings.address` for the port of `service_name`
pub fn resolve_port(settings: &TcpSettings, service_name: &str) -> HostServerResult<u16> {
    let stream = connect(settings)?;
    let mut writer = DataStreamWriter::new(stream.try_clone()?);
    let mut reader = DataStreamReader::new(stream);

    writer.send(service_name.as_bytes())?;

    let status = reader.read_u8()?;
    if status != REPLY_OK {
        return Err(HostServerError::InvalidData(format!(
            "port mapper rejected service {}: reply byte 0x{:02X}",
            service_name, status
        )));
    }
    let port = reader.read_u32()?;
    let port = u16::try_from(port).map_err(|_| {
        HostServerError::InvalidData(format!(
            "port mapper returned port {} for service {}",
            port, service_name
        ))
    })?;

    log::debug!("Port mapper resolved {} to port {}", service_name, port);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(reply: Vec<u8>) -> (TcpSettings, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let settings = TcpSettings::new(listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 9];
            socket.read_exact(&mut request).unwrap();
            socket.write_all(&reply).unwrap();
            request.to_vec()
        });
        (settings, handle)
    }

    #[test]
    fn test_resolve_port() {
        let (settings, handle) = serve_once(vec![0x2B, 0x00, 0x00, 0x21, 0x1B]);
        assert_eq!(resolve_port(&settings, "as-rmtcmd").unwrap(), 8475);
        assert_eq!(handle.join().unwrap(), b"as-rmtcmd".to_vec());
    }

    #[test]
    fn test_rejected_service() {
        let (settings, handle) = serve_once(vec![0x2D, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            resolve_port(&settings, "as-signon"),
            Err(HostServerError::InvalidData(_))
        ));
        handle.join().unwrap();
    }

    #[test]
    fn test_truncated_reply() {
        let (settings, handle) = serve_once(vec![0x2B, 0x00, 0x00]);
        assert!(matches!(
            resolve_port(&settings, "as-signon"),
            Err(HostServerError::UnexpectedEndOfStream { requested: 4, .. })
        ));
        handle.join().unwrap();
    }
}
