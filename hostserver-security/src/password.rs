//! Password substitution
//!
//! The host never receives the password itself. At password levels 0 and 1
//! the client derives a DES token from the user ID and password, then
//! chains five DES encryptions over both seeds, the user ID and a sequence
//! number. The resulting eight bytes are the password substitute.
//!
//! Password levels 2 and above require the SHA-1 based substitute, which is
//! not implemented; asking for it fails before any substitute is sent.

use crate::credentials::{MAX_CREDENTIAL_LENGTH, UserId, ebcdic_len};
use crate::error::{HostServerError, HostServerResult};
use crate::seed::Seed;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};
use des::Des;
use hostserver_codec::EBCDIC_SPACE;

/// Length of a DES password substitute
pub const PASSWORD_SUBSTITUTE_LENGTH: usize = 8;

pub type PasswordSubstitute = [u8; PASSWORD_SUBSTITUTE_LENGTH];

const SEQUENCE: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

/// Password substitution algorithm selected by the host's password level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordEncryption {
    Des,
    Sha,
}

impl PasswordEncryption {
    pub fn for_level(password_level: u8) -> Self {
        if password_level >= 2 {
            PasswordEncryption::Sha
        } else {
            PasswordEncryption::Des
        }
    }

    /// Authentication scheme byte sent in start-server and signon requests
    pub fn auth_scheme(&self) -> u8 {
        match self {
            PasswordEncryption::Des => 0x01,
            PasswordEncryption::Sha => 0x03,
        }
    }
}

/// Compute the password substitute for the given password level
///
/// `password` is the uppercase EBCDIC password without padding.
pub fn encrypt_password(
    user_id: &UserId,
    password: &[u8],
    client_seed: &Seed,
    server_seed: &Seed,
    password_level: u8,
) -> HostServerResult<PasswordSubstitute> {
    check_password_level(password_level)?;
    let token = des_token(user_id, password)?;
    des_substitute(user_id, &token, client_seed, server_seed)
}

/// Fail when the password level needs the SHA substitute
pub fn check_password_level(password_level: u8) -> HostServerResult<()> {
    match PasswordEncryption::for_level(password_level) {
        PasswordEncryption::Des => Ok(()),
        PasswordEncryption::Sha => {
            log::debug!("Refusing SHA password substitution at level {}", password_level);
            Err(HostServerError::Security(format!(
                "password level {} requires SHA password substitution, which is not supported",
                password_level
            )))
        }
    }
}

/// DES token derived from the user ID and password
pub fn des_token(user_id: &UserId, password: &[u8]) -> HostServerResult<[u8; 8]> {
    let length = ebcdic_len(password);
    if length == 0 || length > MAX_CREDENTIAL_LENGTH {
        return Err(HostServerError::Security(format!(
            "password of {} byte(s) cannot be DES encrypted",
            length
        )));
    }

    let mut block = first_eight(user_id);
    if ebcdic_len(user_id) > 8 {
        fold_user_id(&mut block, user_id[8], user_id[9]);
    }

    if length > 8 {
        let first = des_encrypt(&password_key(&password[..8]), &block)?;
        let second = des_encrypt(&password_key(&password[8..length]), &block)?;
        Ok(xor(&first, &second))
    } else {
        des_encrypt(&password_key(&password[..length]), &block)
    }
}

/// Chain the token over both seeds and the user ID
pub fn des_substitute(
    user_id: &UserId,
    token: &[u8; 8],
    client_seed: &Seed,
    server_seed: &Seed,
) -> HostServerResult<PasswordSubstitute> {
    let server_sequence = add(server_seed, &SEQUENCE);

    let mut data = des_encrypt(token, &server_sequence)?;
    data = des_encrypt(token, &xor(&data, client_seed))?;

    let head = first_eight(user_id);
    data = des_encrypt(token, &xor(&xor(&head, &server_sequence), &data))?;

    let mut tail = [EBCDIC_SPACE; 8];
    tail[..2].copy_from_slice(&user_id[8..]);
    data = des_encrypt(token, &xor(&xor(&tail, &server_sequence), &data))?;

    des_encrypt(token, &xor(&xor(&server_sequence, &SEQUENCE), &data))
}

fn des_encrypt(key: &[u8; 8], data: &[u8; 8]) -> HostServerResult<[u8; 8]> {
    let cipher = Des::new_from_slice(key)
        .map_err(|e| HostServerError::Security(format!("invalid DES key: {}", e)))?;
    let mut block = GenericArray::clone_from_slice(data);
    cipher.encrypt_block(&mut block);

    let mut out = [0u8; 8];
    out.copy_from_slice(block.as_slice());
    Ok(out)
}

/// Blank pad a password part to eight bytes, XOR with 0x55 and shift left one bit
fn password_key(part: &[u8]) -> [u8; 8] {
    let mut key = [EBCDIC_SPACE; 8];
    key[..part.len()].copy_from_slice(part);
    for b in key.iter_mut() {
        *b ^= 0x55;
    }
    let shifted = u64::from_be_bytes(key) << 1;
    shifted.to_be_bytes()
}

/// Fold user ID bytes 8 and 9 into the first eight, two bits per byte
fn fold_user_id(block: &mut [u8; 8], ninth: u8, tenth: u8) {
    for (base, extra) in [(0, ninth), (4, tenth)] {
        block[base] ^= extra & 0xC0;
        block[base + 1] ^= (extra & 0x30) << 2;
        block[base + 2] ^= (extra & 0x0C) << 4;
        block[base + 3] ^= (extra & 0x03) << 6;
    }
}

fn first_eight(user_id: &UserId) -> [u8; 8] {
    let mut block = [0u8; 8];
    block.copy_from_slice(&user_id[..8]);
    block
}

fn xor(a: &[u8; 8], b: &[u8; 8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b)) {
        *o = x ^ y;
    }
    out
}

/// Eight-byte big-endian addition, discarding the final carry
fn add(a: &[u8; 8], b: &[u8; 8]) -> [u8; 8] {
    u64::from_be_bytes(*a)
        .wrapping_add(u64::from_be_bytes(*b))
        .to_be_bytes()
}
