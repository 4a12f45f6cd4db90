use crate::message::Message;
use thiserror::Error;

/// Main error type for host server operations
#[derive(Error, Debug)]
pub enum HostServerError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Unexpected end of stream: {missing} of {requested} byte(s) not received")]
    UnexpectedEndOfStream { requested: usize, missing: usize },

    #[error(transparent)]
    DataStream(#[from] DataStreamException),

    #[error("Unsupported encoding: CCSID {0}")]
    UnsupportedEncoding(u32),

    #[error("Invalid digit {0:?}")]
    InvalidDigit(char),

    #[error("Value too large: {0}")]
    ValueTooLarge(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HostServerError {
    /// Host messages attached to this error, if it is a datastream error
    pub fn messages(&self) -> &[Message] {
        match self {
            HostServerError::DataStream(e) => &e.messages,
            _ => &[],
        }
    }
}

/// Result type alias for host server operations
pub type HostServerResult<T> = Result<T, HostServerError>;

/// The four ways a datastream exchange can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataStreamErrorKind {
    #[error("{stream}: bad return code 0x{code:08X}")]
    BadReturnCode { stream: String, code: u32 },

    #[error("{stream}: bad length {length}")]
    BadLength { stream: String, length: u64 },

    #[error("{stream}: unexpected reply codepoint 0x{codepoint:04X}")]
    BadReply { stream: String, codepoint: u16 },

    #[error("{stream}: {message}")]
    ErrorMessage { stream: String, message: String },
}

/// A failed datastream exchange, enriched with any messages the host returned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct DataStreamException {
    pub kind: DataStreamErrorKind,
    pub messages: Vec<Message>,
}

impl DataStreamException {
    pub fn new(kind: DataStreamErrorKind) -> Self {
        Self {
            kind,
            messages: Vec::new(),
        }
    }

    pub fn bad_return_code(stream: impl Into<String>, code: u32) -> Self {
        Self::new(DataStreamErrorKind::BadReturnCode {
            stream: stream.into(),
            code,
        })
    }

    pub fn bad_length(stream: impl Into<String>, length: u64) -> Self {
        Self::new(DataStreamErrorKind::BadLength {
            stream: stream.into(),
            length,
        })
    }

    pub fn bad_reply(stream: impl Into<String>, codepoint: u16) -> Self {
        Self::new(DataStreamErrorKind::BadReply {
            stream: stream.into(),
            codepoint,
        })
    }

    pub fn error_message(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DataStreamErrorKind::ErrorMessage {
            stream: stream.into(),
            message: message.into(),
        })
    }

    /// Attach host messages
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datastream_display() {
        let e = DataStreamException::bad_return_code("StartServerReply", 0x0003000B);
        assert_eq!(e.to_string(), "StartServerReply: bad return code 0x0003000B");

        let e = DataStreamException::bad_length("ExchangeSeedsReply", 16);
        assert_eq!(e.to_string(), "ExchangeSeedsReply: bad length 16");
    }

    #[test]
    fn test_messages_accessor() {
        let msg = Message::new("CPF2204", "User ID unknown", 30);
        let err: HostServerError = DataStreamException::error_message("SignonInfoReply", "User ID unknown")
            .with_messages([msg.clone()])
            .into();
        assert_eq!(err.messages(), &[msg]);
        assert!(HostServerError::ConnectionClosed.messages().is_empty());
    }
}
