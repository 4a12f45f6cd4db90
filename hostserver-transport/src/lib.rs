//! Transport layer for the IBM i host server protocol
//!
//! This crate provides blocking, buffered datastream I/O over any byte
//! stream, optional hex tracing of the bytes that cross the wire, TCP
//! connection setup and the port mapper client.

pub mod error;
pub mod port_mapper;
pub mod reader;
pub mod tcp;
pub mod trace;
pub mod writer;

pub use error::{HostServerError, HostServerResult};
pub use port_mapper::{PORT_MAPPER_PORT, resolve_port};
pub use reader::DataStreamReader;
pub use tcp::{DEFAULT_CONNECT_TIMEOUT, TcpSettings, connect};
pub use trace::{LogTraceSink, MemoryTraceSink, TraceConfig, TraceSink, Tracer};
pub use writer::DataStreamWriter;
