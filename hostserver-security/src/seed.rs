//! Client seed for the seed exchange

use std::time::{SystemTime, UNIX_EPOCH};

/// Length of client and server seeds
pub const SEED_LENGTH: usize = 8;

/// Eight-byte seed contributed to a password substitute
pub type Seed = [u8; SEED_LENGTH];

/// Client seed from the wall clock: milliseconds since the epoch, big endian
pub fn client_seed() -> Seed {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    millis.to_be_bytes()
}
