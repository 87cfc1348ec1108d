// SPDX-License-Identifier: MIT OR Apache-2.0
//! The protocol's Error payload, returned on 4xx responses.

use serde::{Deserialize, Serialize};

/// A parsed protocol Error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Server-assigned reason code, when present.
    pub reason_code: Option<String>,
    /// Human-readable message, when present.
    pub message: Option<String>,
}
