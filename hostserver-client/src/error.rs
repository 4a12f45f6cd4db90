//! Error types shared with the rest of the workspace

pub use hostserver_core::error::{
    DataStreamErrorKind, DataStreamException, HostServerError, HostServerResult,
};
