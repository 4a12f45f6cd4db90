//! Host message value type

use serde::{Deserialize, Serialize};
use std::fmt;

/// An informational or diagnostic message surfaced by the host
///
/// Messages are attached to datastream errors (for example the text of a
/// well-known sign-on return code) and may also be returned by the signon
/// server when structured error messages were requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, e.g. `CPF22E2`
    pub id: String,
    /// First-level message text
    pub text: String,
    /// Message severity (0-99)
    pub severity: u8,
}

impl Message {
    /// Create a new message
    pub fn new(id: impl Into<String>, text: impl Into<String>, severity: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            severity,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            write!(f, "{}", self.text)
        } else {
            write!(f, "{}: {}", self.id, self.text)
        }
    }
}
