//! TCP connection setup

use crate::error::{HostServerError, HostServerResult};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSettings {
    pub address: SocketAddr,
    pub connect_timeout: Option<Duration>,
    /// `None` blocks reads indefinitely
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl TcpSettings {
    /// Create new TCP settings
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Resolve `host` and `port` to the first matching socket address
    pub fn resolve(host: &str, port: u16) -> HostServerResult<Self> {
        let address = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            HostServerError::Config(format!("host {} did not resolve to an address", host))
        })?;
        Ok(Self::new(address))
    }

    /// Same timeouts, different port
    pub fn with_port(&self, port: u16) -> Self {
        let mut settings = self.clone();
        settings.address.set_port(port);
        settings
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Open a blocking TCP stream with the configured timeouts applied
pub fn connect(settings: &TcpSettings) -> HostServerResult<TcpStream> {
    let stream = match settings.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&settings.address, timeout)?,
        None => TcpStream::connect(settings.address)?,
    };
    stream.set_read_timeout(settings.read_timeout)?;
    stream.set_write_timeout(settings.write_timeout)?;
    stream.set_nodelay(true)?;
    log::debug!("Connected to {}", settings.address);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_settings() {
        let addr: SocketAddr = "127.0.0.1:8476".parse().unwrap();
        let settings = TcpSettings::new(addr).with_read_timeout(Some(Duration::from_secs(5)));
        assert_eq!(settings.address, addr);
        assert_eq!(settings.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(settings.read_timeout, Some(Duration::from_secs(5)));

        let other = settings.with_port(8475);
        assert_eq!(other.address.port(), 8475);
        assert_eq!(other.read_timeout, settings.read_timeout);
    }

    #[test]
    fn test_resolve_localhost() {
        let settings = TcpSettings::resolve("127.0.0.1", 449).unwrap();
        assert_eq!(settings.address.port(), 449);
    }

    #[test]
    fn test_connect_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let settings = TcpSettings::new(listener.local_addr().unwrap())
            .with_write_timeout(Some(Duration::from_secs(1)));
        let stream = connect(&settings).unwrap();
        assert_eq!(stream.write_timeout().unwrap(), Some(Duration::from_secs(1)));
        assert!(stream.nodelay().unwrap());
    }
}
