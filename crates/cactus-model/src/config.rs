// SPDX-License-Identifier: MIT OR Apache-2.0
//! Client and server configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A test client's role in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A single end device acting for itself.
    Device,
    /// An aggregator acting on behalf of one or more end devices.
    Aggregator,
}

/// Configuration for one logical test client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientConfig {
    /// Stable identifier used to address this client from a test procedure.
    pub id: String,
    /// Protocol role.
    pub role: Role,
    /// Path to the client's TLS certificate (PEM).
    pub cert_path: PathBuf,
    /// Path to the client's TLS private key (PEM).
    pub key_path: PathBuf,
    /// 40-hex-char long-form device identifier.
    pub lfdi: String,
    /// Private enterprise number used in generated mRIDs.
    pub pen: u32,
    /// Registration PIN.
    pub pin: u32,
    /// Nominal maximum real power, watts.
    pub nominal_max_watts: i32,
    /// Optional `User-Agent` header value.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// This client's short-form device identifier, derived from `lfdi`.
    ///
    /// # Errors
    ///
    /// Returns an error if `lfdi` is not exactly 40 hex characters.
    pub fn sfdi(&self) -> Result<u64, cactus_error::ConfigKind> {
        cactus_sfdi(&self.lfdi).ok_or_else(|| cactus_error::ConfigKind::Invalid {
            reasons: vec![format!("client {} has a malformed LFDI", self.id)],
        })
    }
}

/// Compute SFDI from a 40-hex-char LFDI (kept here to avoid a circular
/// dependency on `cactus-util`; `cactus-util` re-exports the same
/// algorithm as the canonical entry point used elsewhere).
#[must_use]
pub fn cactus_sfdi(lfdi: &str) -> Option<u64> {
    if lfdi.len() != 40 || !lfdi.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let raw = u64::from_str_radix(&lfdi[..9], 16).ok()?;
    let digit_sum: u32 = raw
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .sum();
    let checksum = (10 - (digit_sum % 10)) % 10;
    Some(raw * 10 + u64::from(checksum))
}

/// Server-under-test configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServerConfig {
    /// Base URI of the device-capability endpoint.
    pub device_capability_uri: String,
    /// Whether to verify the server's TLS hostname.
    #[serde(default = "default_true")]
    pub verify_hostname: bool,
    /// Optional path to a trust-anchor certificate (PEM). If absent, the
    /// system default trust store is used.
    #[serde(default)]
    pub trust_anchor_path: Option<PathBuf>,
    /// Base URI of the external notification-collector service.
    pub notification_collector_uri: String,
    /// Expected server-minted PEN (used by `is-invalid-resource`).
    pub server_pen: u32,
    /// Delay to wait between a write and its refetch.
    #[serde(with = "duration_millis")]
    pub refetch_delay: Duration,
}

fn default_true() -> bool {
    true
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(val: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        val.as_millis().serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let ms: u64 = u64::deserialize(de)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sfdi_rejects_wrong_length() {
        assert_eq!(cactus_sfdi("abc"), None);
    }

    #[test]
    fn sfdi_computes_checksum() {
        let lfdi = "0".repeat(39) + "1";
        let sfdi = cactus_sfdi(&lfdi).unwrap();
        assert_eq!(sfdi % 10, (10 - (0 % 10)) % 10);
    }
}
