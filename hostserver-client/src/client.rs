//! Entry point for opening connections to one host
//!
//! ```rust,no_run
//! use hostserver_client::{ConnectionBuilder, HostClient, Service};
//!
//! let config = ConnectionBuilder::new()
//!     .host("myhost")
//!     .credentials("qsecofr", "secret")
//!     .build()?;
//! let client = HostClient::new(config)?;
//!
//! let info = client.system_info()?;
//! println!("{} runs {}", info.host, info.release_string());
//!
//! let conn = client.connect(Service::RemoteCommand)?;
//! println!("remote command job {}", conn.job_name());
//! conn.close()?;
//! # Ok::<(), hostserver_client::HostServerError>(())
//! ```

use crate::config::ConnectionConfig;
use crate::connection::{Connection, Transport};
use crate::error::HostServerResult;
use crate::handshake::{Credentials, signon, start_service};
use crate::service::Service;
use hostserver_codec::Codec;
use hostserver_core::SystemInfo;
use hostserver_security::normalize_user;
use hostserver_transport::{PORT_MAPPER_PORT, TcpSettings, connect, resolve_port};
use std::sync::{Arc, Mutex, PoisonError};

/// Opens authenticated connections to the host named in its configuration
///
/// The first signon records the host's [`SystemInfo`]; later service
/// connections reuse it to pick the password encryption.
#[derive(Debug)]
pub struct HostClient {
    config: ConnectionConfig,
    codec: &'static Codec,
    info: Mutex<Option<SystemInfo>>,
}

impl HostClient {
    /// # Errors
    /// `Config` when the configuration does not validate.
    pub fn new(config: ConnectionConfig) -> HostServerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codec: Codec::shared(),
            info: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Sign on as the configured user and keep the signon connection open
    pub fn signon(&self) -> HostServerResult<Arc<Connection>> {
        self.signon_as(&self.config.user, &self.config.password)
    }

    /// Host facts, signing on once if they are not known yet
    pub fn system_info(&self) -> HostServerResult<SystemInfo> {
        if let Some(info) = self.cached_info() {
            return Ok(info);
        }
        let conn = self.signon()?;
        let info = conn.info().clone();
        conn.close()?;
        Ok(info)
    }

    /// Connect to `service` as the configured user
    pub fn connect(&self, service: Service) -> HostServerResult<Arc<Connection>> {
        self.connect_as(service, &self.config.user, &self.config.password)
    }

    /// Connect to `service` as another user
    pub fn connect_as(
        &self,
        service: Service,
        user: &str,
        password: &str,
    ) -> HostServerResult<Arc<Connection>> {
        if service == Service::Signon {
            return self.signon_as(user, password);
        }

        let info = self.system_info()?;
        let mut transport = self.open_transport(service)?;
        let credentials = Credentials { user, password };
        let job_name = {
            let Transport { reader, writer, .. } = &mut transport;
            start_service(reader, writer, service, &info, credentials, self.codec)?
        };
        let conn = Connection::new(service, info, normalize_user(user)?, job_name, transport);
        log::debug!("Opened {} connection {} ({})", service, conn.id(), conn.job_name());
        Ok(Arc::new(conn))
    }

    fn signon_as(&self, user: &str, password: &str) -> HostServerResult<Arc<Connection>> {
        let mut transport = self.open_transport(Service::Signon)?;
        let credentials = Credentials { user, password };
        let outcome = {
            let Transport { reader, writer, .. } = &mut transport;
            signon(reader, writer, &self.config, credentials, self.codec)?
        };

        *self.info.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome.info.clone());

        let job_name = outcome.info.signon_job_name.clone();
        let conn = Connection::new(
            Service::Signon,
            outcome.info,
            normalize_user(user)?,
            job_name,
            transport,
        );
        Ok(Arc::new(conn))
    }

    fn cached_info(&self) -> Option<SystemInfo> {
        self.info
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn settings(&self, port: u16) -> HostServerResult<TcpSettings> {
        Ok(TcpSettings::resolve(&self.config.host, port)?
            .with_connect_timeout(self.config.connect_timeout)
            .with_read_timeout(self.config.read_timeout)
            .with_write_timeout(self.config.write_timeout))
    }

    /// Port override, then port mapper (if enabled), then well-known port
    fn port(&self, service: Service) -> HostServerResult<u16> {
        if let Some(port) = self.config.port_override(service) {
            return Ok(port);
        }
        if self.config.use_port_mapper {
            let mapper = self.settings(PORT_MAPPER_PORT)?;
            return resolve_port(&mapper, service.port_mapper_name());
        }
        Ok(service.default_port())
    }

    fn open_transport(&self, service: Service) -> HostServerResult<Transport> {
        let settings = self.settings(self.port(service)?)?;
        let stream = connect(&settings)?;
        Transport::from_tcp(stream, self.config.trace)
    }
}
