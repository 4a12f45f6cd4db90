//! User ID and password preparation
//!
//! The host compares credentials in uppercase CCSID 37. User IDs are blank
//! padded to ten bytes; passwords that begin with a digit get a `Q` prefix,
//! the same rule the host applies when a password is set.

use crate::error::{HostServerError, HostServerResult};
use hostserver_codec::{Codec, EBCDIC_SPACE};

/// Maximum length of a user ID or DES-era password
pub const MAX_CREDENTIAL_LENGTH: usize = 10;

/// Ten-byte blank padded EBCDIC user ID
pub type UserId = [u8; MAX_CREDENTIAL_LENGTH];

/// Uppercase the user ID and check its length
pub fn normalize_user(user: &str) -> HostServerResult<String> {
    let user = user.trim().to_uppercase();
    if user.is_empty() {
        return Err(HostServerError::Security("user ID is empty".to_string()));
    }
    if user.chars().count() > MAX_CREDENTIAL_LENGTH {
        return Err(HostServerError::Security(format!(
            "user ID {} is longer than {} characters",
            user, MAX_CREDENTIAL_LENGTH
        )));
    }
    Ok(user)
}

/// Uppercase the password and apply the `Q` prefix rule
pub fn normalize_password(password: &str) -> HostServerResult<String> {
    let mut normalized = password.to_uppercase();
    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        normalized.insert(0, 'Q');
    }
    if normalized.is_empty() {
        return Err(HostServerError::Security("password is empty".to_string()));
    }
    if normalized.chars().count() > MAX_CREDENTIAL_LENGTH {
        return Err(HostServerError::Security(format!(
            "password is longer than {} characters",
            MAX_CREDENTIAL_LENGTH
        )));
    }
    Ok(normalized)
}

/// Encode a user ID as ten blank padded EBCDIC bytes
pub fn encode_user_id(codec: &Codec, user: &str) -> HostServerResult<UserId> {
    let user = normalize_user(user)?;
    let mut user_id = [EBCDIC_SPACE; MAX_CREDENTIAL_LENGTH];
    codec.cp037().encode_into(&user, &mut user_id);
    Ok(user_id)
}

/// Encode a password as uppercase EBCDIC, without padding
pub fn encode_password(codec: &Codec, password: &str) -> HostServerResult<Vec<u8>> {
    let password = normalize_password(password)?;
    Ok(codec.text_to_ebcdic37(&password))
}

/// Length of an EBCDIC field up to the first blank or NUL
pub(crate) fn ebcdic_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .position(|&b| b == EBCDIC_SPACE || b == 0)
        .unwrap_or(bytes.len())
}
