//! Security module for the IBM i host server protocol
//!
//! This crate provides the client seed, credential preparation and the
//! DES password substitute used by the seed exchange handshake.

pub mod credentials;
pub mod error;
pub mod password;
pub mod seed;

pub use credentials::{
    MAX_CREDENTIAL_LENGTH, UserId, encode_password, encode_user_id, normalize_password,
    normalize_user,
};
pub use error::{HostServerError, HostServerResult};
pub use password::{
    PASSWORD_SUBSTITUTE_LENGTH, PasswordEncryption, PasswordSubstitute, check_password_level,
    encrypt_password,
};
pub use seed::{SEED_LENGTH, Seed, client_seed};
