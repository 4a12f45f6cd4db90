//! Per-host fact sheet produced by the signon handshake

use serde::{Deserialize, Serialize};

/// Facts about one host learned during a signon handshake
///
/// Every service connection to the same host needs these values: the
/// password level selects the password encryption algorithm, the server
/// CCSID selects the codec for host text, and the signon job name
/// identifies the prestart job that vouched for this information.
///
/// The value is immutable. The CCSID reported by the signon-info reply is
/// folded in once with [`SystemInfo::with_server_ccsid`], producing a new
/// value instead of mutating a shared one.
///
/// Equality covers every field, so two signons against the same host that
/// were served by different prestart jobs compare unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Host name or address the signon connected to
    pub host: String,
    /// Server version, encoded as `0x00VVRRMM`
    pub server_version: u32,
    /// Server datastream level
    pub server_level: u16,
    /// Server CCSID (0 until the signon-info reply reports it)
    pub server_ccsid: u32,
    /// Password encryption level (0/1 = DES, 2+ = SHA)
    pub password_level: u8,
    /// Qualified name of the signon job, e.g. `123456/QUSER/QZSOSIGN`
    pub signon_job_name: String,
}

impl SystemInfo {
    pub fn new(
        host: impl Into<String>,
        server_version: u32,
        server_level: u16,
        server_ccsid: u32,
        password_level: u8,
        signon_job_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            server_version,
            server_level,
            server_ccsid,
            password_level,
            signon_job_name: signon_job_name.into(),
        }
    }

    /// Return a copy carrying the CCSID reported after authentication
    pub fn with_server_ccsid(self, server_ccsid: u32) -> Self {
        Self {
            server_ccsid,
            ..self
        }
    }

    /// Version component of the server release
    pub fn version(&self) -> u16 {
        ((self.server_version >> 16) & 0xFFFF) as u16
    }

    /// Release component of the server release
    pub fn release(&self) -> u8 {
        ((self.server_version >> 8) & 0xFF) as u8
    }

    /// Modification component of the server release
    pub fn modification(&self) -> u8 {
        (self.server_version & 0xFF) as u8
    }

    /// Release in the conventional `VxRyMz` form
    pub fn release_string(&self) -> String {
        format!(
            "V{}R{}M{}",
            self.version(),
            self.release(),
            self.modification()
        )
    }

    /// Whether the host requires SHA based password substitution
    pub fn uses_sha_passwords(&self) -> bool {
        self.password_level >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SystemInfo {
        SystemInfo::new("myhost", 0x0007_0500, 10, 0, 0, "123456/QUSER/QZSOSIGN")
    }

    #[test]
    fn test_release_string() {
        assert_eq!(sample().release_string(), "V7R5M0");
    }

    #[test]
    fn test_with_server_ccsid() {
        let info = sample();
        let updated = info.clone().with_server_ccsid(37);
        assert_eq!(updated.server_ccsid, 37);
        assert_eq!(info.server_ccsid, 0);
        assert_ne!(info, updated);
    }

    #[test]
    fn test_equality_distinguishes_signon_job() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);
        b.signon_job_name = "123457/QUSER/QZSOSIGN".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_level() {
        assert!(!sample().uses_sha_passwords());
        let mut info = sample();
        info.password_level = 2;
        assert!(info.uses_sha_passwords());
    }
}
