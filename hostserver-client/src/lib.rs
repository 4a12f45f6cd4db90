//! Connections and connection pooling for the IBM i host server protocol
//!
//! This crate provides the connection layer on top of the handshake
//! datastreams:
//!
//! - [`ConnectionConfig`] / [`ConnectionBuilder`]: host, credentials, ports
//!   and timeouts
//! - [`HostClient`]: signs on, learns the host's [`SystemInfo`] and opens
//!   service connections
//! - [`Connection`]: one authenticated socket with close-once semantics
//! - [`ConnectionPool`]: idle connections cached per user

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod handshake;
pub mod pool;
pub mod service;

pub use client::HostClient;
pub use config::{ConnectionBuilder, ConnectionConfig, DEFAULT_CLIENT_CCSID};
pub use connection::{Connection, HostSocket, Transport};
pub use error::{DataStreamErrorKind, DataStreamException, HostServerError, HostServerResult};
pub use handshake::{Credentials, SignonOutcome};
pub use hostserver_core::{Message, SystemInfo};
pub use pool::ConnectionPool;
pub use service::Service;
