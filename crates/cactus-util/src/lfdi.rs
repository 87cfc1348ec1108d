// SPDX-License-Identifier: MIT OR Apache-2.0
//! LFDI/SFDI derivation.

use sha2::{Digest, Sha256};

/// Derive the SFDI from a 40-hex-char LFDI.
///
/// Truncates the LFDI to its first 9 hex chars, converts to an integer
/// `raw`, then appends a decimal checksum digit:
/// `checksum = (10 - (digit_sum(raw) mod 10)) mod 10`.
///
/// Returns `None` if `lfdi` is not exactly 40 hex characters.
#[must_use]
pub fn convert_lfdi_to_sfdi(lfdi: &str) -> Option<u64> {
    cactus_model::config::cactus_sfdi(lfdi)
}

/// Derive the upper-case 40-hex-char LFDI from a leaf certificate's DER
/// encoding: SHA-256 the DER bytes, take the first 40 hex chars, upper-case.
#[must_use]
pub fn lfdi_from_der(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    hex::encode(digest)[..40].to_ascii_uppercase()
}

/// Parse a PEM-encoded leaf certificate and derive its LFDI.
///
/// # Errors
///
/// Returns an error if `pem` does not contain a parseable certificate.
pub fn lfdi_from_pem(pem: &[u8]) -> Result<String, LfdiError> {
    let (_, pem_obj) = x509_parser::pem::parse_x509_pem(pem).map_err(|e| LfdiError {
        reason: e.to_string(),
    })?;
    // pem_obj.contents is already the DER-encoded certificate.
    Ok(lfdi_from_der(&pem_obj.contents))
}

/// Failure deriving an LFDI from a certificate.
#[derive(Debug, thiserror::Error)]
#[error("failed to derive LFDI from certificate: {reason}")]
pub struct LfdiError {
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(convert_lfdi_to_sfdi("abcd"), None);
    }

    proptest! {
        #[test]
        fn case_insensitive(bytes in proptest::collection::vec(0u8..16, 40)) {
            let lower: String = bytes.iter().map(|b| std::char::from_digit(u32::from(*b), 16).unwrap()).collect();
            let upper = lower.to_uppercase();
            prop_assert_eq!(convert_lfdi_to_sfdi(&lower), convert_lfdi_to_sfdi(&upper));
        }
    }
}
