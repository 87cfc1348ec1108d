// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-util
//!
//! Free-standing value utilities shared across the cactus harness:
//! mRID generation, hex-binary equivalence, LFDI/SFDI derivation,
//! tolerant property diffing for submit-and-refetch comparisons, and the
//! value-range/provenance validity checks used by resource-level
//! validation.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Hex-binary string parsing and tolerant equivalence.
pub mod hexbin;
/// LFDI/SFDI derivation from certificates and raw identifiers.
pub mod lfdi;
/// mRID generation for client-originated resources.
pub mod mrid;
/// Tolerant diffing between a submitted payload and its refetch.
pub mod property_diff;
/// Value-range and resource-provenance validity checks.
pub mod validity;

pub use hexbin::{hex_binary_eq, hex_binary_str_eq, parse_hex_binary, to_hex_binary};
pub use lfdi::{convert_lfdi_to_sfdi, lfdi_from_der, lfdi_from_pem, LfdiError};
pub use mrid::{explicit_mrid, mmr_mrid, mrid_from_seed, mup_mrid};
pub use property_diff::{property_diff, FieldDiff, MAX_TIME_DRIFT_SECONDS};
pub use validity::{is_invalid_mrid, is_invalid_power_type, is_invalid_resource, is_invalid_signed_percent};
