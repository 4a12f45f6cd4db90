//! Core types and utilities for the IBM i host server protocol
//!
//! This crate provides the error taxonomy, the host message value type and
//! the per-system fact sheet (`SystemInfo`) shared by every layer of the
//! host server client: codec, transport, handshake and connection pool.

pub mod error;
pub mod message;
pub mod system_info;

pub use error::{DataStreamErrorKind, DataStreamException, HostServerError, HostServerResult};
pub use message::Message;
pub use system_info::SystemInfo;
