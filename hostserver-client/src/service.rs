//! Host server services

use serde::{Deserialize, Serialize};
use std::fmt;

/// A host server a client can connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Service {
    /// Signon server: authentication and system attributes
    Signon,
    /// Remote command and program call server
    RemoteCommand,
    /// DDM/DRDA server
    Ddm,
    /// Integrated file system server
    File,
    /// Database server
    Database,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Signon,
        Service::RemoteCommand,
        Service::Ddm,
        Service::File,
        Service::Database,
    ];

    /// Server ID carried in every datastream header
    pub fn server_id(&self) -> u16 {
        match self {
            Service::Signon => 0xE009,
            Service::RemoteCommand => 0xE008,
            Service::Ddm => 0xE005,
            Service::File => 0xE002,
            Service::Database => 0xE004,
        }
    }

    /// Well-known (non-TLS) port
    pub fn default_port(&self) -> u16 {
        match self {
            Service::Signon => 8476,
            Service::RemoteCommand => 8475,
            Service::Ddm => 446,
            Service::File => 8473,
            Service::Database => 8471,
        }
    }

    /// Name the port mapper knows this service by
    pub fn port_mapper_name(&self) -> &'static str {
        match self {
            Service::Signon => "as-signon",
            Service::RemoteCommand => "as-rmtcmd",
            Service::Ddm => "drda",
            Service::File => "as-file",
            Service::Database => "as-database",
        }
    }

    /// Whether closing a connection sends an end job request first
    ///
    /// The DDM server ends its job when the socket closes.
    pub fn sends_end_job(&self) -> bool {
        !matches!(self, Service::Ddm)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Signon => "signon",
            Service::RemoteCommand => "remote command",
            Service::Ddm => "DDM",
            Service::File => "file",
            Service::Database => "database",
        };
        f.write_str(name)
    }
}
