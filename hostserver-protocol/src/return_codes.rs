//! Well-known sign-on return codes
//!
//! Start-server, exchange-attributes and signon-info replies share these
//! codes. A known code becomes an `ErrorMessage` carrying a readable
//! [`Message`]; any other non-zero code is reported as `BadReturnCode`.

use crate::error::{DataStreamException, HostServerError};
use hostserver_core::Message;

/// Severity given to messages built from this table
const SEVERITY: u8 = 40;

pub const RC_USER_ID_UNKNOWN: u32 = 0x0002_0001;
pub const RC_USER_ID_DISABLED: u32 = 0x0002_0002;
pub const RC_PASSWORD_INCORRECT: u32 = 0x0003_000B;
pub const RC_PASSWORD_INCORRECT_DISABLE_NEXT: u32 = 0x0003_000C;
pub const RC_PASSWORD_EXPIRED: u32 = 0x0003_000D;
pub const RC_PASSWORD_PRE_V2R2: u32 = 0x0003_000E;
pub const RC_PASSWORD_NONE: u32 = 0x0003_0010;

static RETURN_CODES: &[(u32, &str, &str)] = &[
    (RC_USER_ID_UNKNOWN, "CPF2204", "User ID unknown"),
    (RC_USER_ID_DISABLED, "CPF22E3", "User profile is disabled"),
    (RC_PASSWORD_INCORRECT, "CPF22E2", "Password or Passphrase incorrect"),
    (
        RC_PASSWORD_INCORRECT_DISABLE_NEXT,
        "CPF22E2",
        "Password or Passphrase incorrect, user profile will be disabled on next invalid attempt",
    ),
    (RC_PASSWORD_EXPIRED, "CPF22E4", "Password or Passphrase has expired"),
    (RC_PASSWORD_PRE_V2R2, "", "Pre-V2R2 encrypted password"),
    (RC_PASSWORD_NONE, "CPF22E5", "Password is *NONE"),
];

/// Message for a well-known return code
pub fn lookup(code: u32) -> Option<Message> {
    RETURN_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, id, text)| Message::new(id, text, SEVERITY))
}

/// Error for a non-zero return code, with any host messages attached
pub fn return_code_error(stream: &str, code: u32, host_messages: Vec<Message>) -> HostServerError {
    let exception = match lookup(code) {
        Some(message) => DataStreamException::error_message(stream, message.text.clone())
            .with_messages(std::iter::once(message)),
        None => DataStreamException::bad_return_code(stream, code),
    };
    exception.with_messages(host_messages).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataStreamErrorKind;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(0x0003000B).unwrap().text, "Password or Passphrase incorrect");
        assert_eq!(lookup(0x00020001).unwrap().id, "CPF2204");
        assert!(lookup(0x00040000).is_none());
        assert!(lookup(0).is_none());
    }

    #[test]
    fn test_known_code_becomes_error_message() {
        let err = return_code_error("StartServerReply", 0x0003000B, Vec::new());
        assert_eq!(err.messages()[0].text, "Password or Passphrase incorrect");
        match err {
            HostServerError::DataStream(e) => assert_eq!(
                e.kind,
                DataStreamErrorKind::ErrorMessage {
                    stream: "StartServerReply".to_string(),
                    message: "Password or Passphrase incorrect".to_string()
                }
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_code_keeps_host_messages() {
        let host = Message::new("CPF9999", "Function check", 40);
        let err = return_code_error("SignonInfoReply", 0x00040001, vec![host.clone()]);
        assert_eq!(err.messages(), &[host]);
        assert!(err.to_string().contains("0x00040001"));
    }
}
