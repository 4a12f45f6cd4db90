//! hostserver - Rust client core for the IBM i host server protocol
//!
//! This library implements the layer every host server connection shares:
//! framed socket I/O, the seed exchange and password substitution
//! handshake, the EBCDIC and decimal codecs, and a connection pool.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `hostserver-core`: error taxonomy, host messages, `SystemInfo`
//! - `hostserver-codec`: EBCDIC/CCSID text, packed/zoned decimal, DECFLOAT
//! - `hostserver-transport`: datastream reader/writer, tracing, TCP, port mapper
//! - `hostserver-security`: client seed, credentials, DES password substitute
//! - `hostserver-protocol`: header, LL/CP fields, handshake datastreams
//! - `hostserver-client`: connections, handshakes, connection pool
//!
//! # Usage
//!
//! ```no_run
//! use hostserver::{ConnectionBuilder, ConnectionPool, HostClient, Service};
//!
//! let config = ConnectionBuilder::new()
//!     .host("myhost")
//!     .credentials("qsecofr", "secret")
//!     .build()?;
//! let client = HostClient::new(config)?;
//! let pool = ConnectionPool::new(client.system_info()?);
//!
//! let conn = match pool.checkout("qsecofr") {
//!     Some(conn) => conn,
//!     None => client.connect(Service::RemoteCommand)?,
//! };
//! // ... exchange requests through conn.lock()? ...
//! pool.checkin(conn);
//! pool.close();
//! # Ok::<(), hostserver::HostServerError>(())
//! ```

// Re-export core types
pub use hostserver_core::{
    DataStreamErrorKind, DataStreamException, HostServerError, HostServerResult, Message,
    SystemInfo,
};

// Re-export client API
pub use hostserver_client::{
    Connection, ConnectionBuilder, ConnectionConfig, ConnectionPool, HostClient, Service,
};

pub mod codec {
    pub use hostserver_codec::*;
}

pub mod transport {
    pub use hostserver_transport::*;
}

pub mod security {
    pub use hostserver_security::*;
}

pub mod protocol {
    pub use hostserver_protocol::*;
}

pub mod client {
    pub use hostserver_client::*;
}
