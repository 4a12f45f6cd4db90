//! Connection configuration
//!
//! [`ConnectionConfig`] holds everything needed to reach and sign on to one
//! host. It can be loaded with serde (the password is never serialized) or
//! assembled with [`ConnectionBuilder`], which validates it on `build()`.
//!
//! ```rust,no_run
//! use hostserver_client::{ConnectionBuilder, Service};
//!
//! let config = ConnectionBuilder::new()
//!     .host("myhost")
//!     .credentials("qsecofr", "secret")
//!     .port(Service::Signon, 8476)
//!     .build()?;
//! # Ok::<(), hostserver_client::HostServerError>(())
//! ```

use crate::error::{HostServerError, HostServerResult};
use crate::service::Service;
use hostserver_protocol::DEFAULT_DATASTREAM_LEVEL;
use hostserver_security::{normalize_password, normalize_user};
use hostserver_transport::{DEFAULT_CONNECT_TIMEOUT, TraceConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// CCSID the client announces during signon (UTF-16)
pub const DEFAULT_CLIENT_CCSID: u32 = 1200;

/// Connection settings for one host and user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub user: String,
    #[serde(skip)]
    pub password: String,
    /// Per-service port overrides
    pub ports: BTreeMap<Service, u16>,
    /// Ask the port mapper for ports that are not overridden
    pub use_port_mapper: bool,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub trace: TraceConfig,
    pub client_ccsid: u32,
    pub datastream_level: u16,
    /// Ask newer signon servers for structured error messages
    pub request_messages: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            ports: BTreeMap::new(),
            use_port_mapper: false,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: None,
            write_timeout: None,
            trace: TraceConfig::default(),
            client_ccsid: DEFAULT_CLIENT_CCSID,
            datastream_level: DEFAULT_DATASTREAM_LEVEL,
            request_messages: true,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ports", &self.ports)
            .field("use_port_mapper", &self.use_port_mapper)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("trace", &self.trace)
            .field("client_ccsid", &self.client_ccsid)
            .field("datastream_level", &self.datastream_level)
            .field("request_messages", &self.request_messages)
            .finish()
    }
}

impl ConnectionConfig {
    /// Port override for `service`, if any
    pub fn port_override(&self, service: Service) -> Option<u16> {
        self.ports.get(&service).copied()
    }

    /// Check the host and credentials
    pub fn validate(&self) -> HostServerResult<()> {
        if self.host.trim().is_empty() {
            return Err(HostServerError::Config("host is empty".to_string()));
        }
        normalize_user(&self.user).map_err(into_config_error)?;
        normalize_password(&self.password).map_err(into_config_error)?;
        Ok(())
    }
}

fn into_config_error(error: HostServerError) -> HostServerError {
    match error {
        HostServerError::Security(message) => HostServerError::Config(message),
        other => other,
    }
}

/// Fluent builder for [`ConnectionConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConnectionBuilder {
    config: ConnectionConfig,
}

impl ConnectionBuilder {
    /// Builder with default settings
    ///
    /// Defaults: well-known ports, no port mapper, 30 second connect
    /// timeout, no read or write timeout, tracing off, client CCSID 1200.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.host = host.to_string();
        self
    }

    pub fn credentials(mut self, user: &str, password: &str) -> Self {
        self.config.user = user.to_string();
        self.config.password = password.to_string();
        self
    }

    /// Connect to `service` on `port` instead of its well-known port
    pub fn port(mut self, service: Service, port: u16) -> Self {
        self.config.ports.insert(service, port);
        self
    }

    pub fn use_port_mapper(mut self, enabled: bool) -> Self {
        self.config.use_port_mapper = enabled;
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn trace(mut self, trace: TraceConfig) -> Self {
        self.config.trace = trace;
        self
    }

    pub fn client_ccsid(mut self, ccsid: u32) -> Self {
        self.config.client_ccsid = ccsid;
        self
    }

    pub fn datastream_level(mut self, level: u16) -> Self {
        self.config.datastream_level = level;
        self
    }

    pub fn request_messages(mut self, enabled: bool) -> Self {
        self.config.request_messages = enabled;
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    /// `Config` for an empty host, an empty or over-long user ID, or a
    /// password longer than ten characters once a leading digit has been
    /// given its `Q` prefix.
    pub fn build(self) -> HostServerResult<ConnectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new().host("myhost").credentials("qsecofr", "secret")
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.read_timeout, None);
        assert!(!config.use_port_mapper);
        assert!(!config.trace.enabled);
        assert_eq!(config.trace.bytes_per_line, 16);
        assert_eq!(config.client_ccsid, 1200);
        assert_eq!(config.port_override(Service::Signon), None);
    }

    #[test]
    fn test_port_override() {
        let config = builder().port(Service::Database, 18471).build().unwrap();
        assert_eq!(config.port_override(Service::Database), Some(18471));
        assert_eq!(config.port_override(Service::File), None);
    }

    #[test]
    fn test_validation() {
        let empty_host = ConnectionBuilder::new().credentials("user", "pw").build();
        assert!(matches!(empty_host, Err(HostServerError::Config(_))));

        let empty_user = builder().credentials("  ", "pw").build();
        assert!(matches!(empty_user, Err(HostServerError::Config(_))));

        // ten digits become eleven characters with the Q prefix
        let long_password = builder().credentials("user", "1234567890").build();
        assert!(matches!(long_password, Err(HostServerError::Config(_))));

        assert!(builder().credentials("user", "123456789").build().is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = builder().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
