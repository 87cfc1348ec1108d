// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Error taxonomy for the cactus conformance harness.
//!
//! The harness distinguishes *kinds* of failure, not just error types, so
//! that the scheduler and evaluator can decide whether a failure degrades to
//! a warning, is retriable, or ends the run. Every variant carries a stable
//! code of the form `CACTUS-X###`:
//!
//! - **Q** — request (transport/HTTP/XSD)
//! - **N** — notification (webhook collector)
//! - **F** — config (missing/invalid configuration)
//! - **D** — test definition (authoring bug)
//! - **U** — unhandled (escaped from an action/check)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Transport failure (connection refused, DNS, TLS handshake).
    RequestTransport,
    /// Response status was not one of the expected codes for the call.
    RequestUnexpectedStatus,
    /// Response body failed to parse as the declared payload type.
    RequestParseFailure,
    /// Pagination exceeded `max-pages` without exhausting the list.
    RequestPaginationOverflow,
    /// A write response lacked the required `Location` header.
    RequestMissingLocation,
    /// The notification collector returned an error for a configured alias.
    NotificationCollectorFailure,
    /// An action referenced a subscription alias with no endpoints.
    NotificationUnknownAlias,
    /// The configuration file was missing or unreadable.
    ConfigMissing,
    /// The configuration file failed semantic validation.
    ConfigInvalid,
    /// A referenced certificate or key file does not exist.
    ConfigMissingCredential,
    /// The requested output directory could not be created.
    ConfigOutputDirectory,
    /// A step parameter failed to resolve to the expected type.
    TestDefinitionBadParameter,
    /// A step referenced an unknown alias (e.g. an unregistered mup-id).
    TestDefinitionUnknownAlias,
    /// Parallel value-lists supplied to an action had inconsistent lengths.
    TestDefinitionInconsistentLengths,
    /// An action or check panicked or returned an unmodelled error.
    Unhandled,
}

impl ErrorCode {
    /// Machine-readable code string (e.g. `"CACTUS-Q001"`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestTransport => "CACTUS-Q001",
            Self::RequestUnexpectedStatus => "CACTUS-Q002",
            Self::RequestParseFailure => "CACTUS-Q003",
            Self::RequestPaginationOverflow => "CACTUS-Q004",
            Self::RequestMissingLocation => "CACTUS-Q005",
            Self::NotificationCollectorFailure => "CACTUS-N001",
            Self::NotificationUnknownAlias => "CACTUS-N002",
            Self::ConfigMissing => "CACTUS-F001",
            Self::ConfigInvalid => "CACTUS-F002",
            Self::ConfigMissingCredential => "CACTUS-F003",
            Self::ConfigOutputDirectory => "CACTUS-F004",
            Self::TestDefinitionBadParameter => "CACTUS-D001",
            Self::TestDefinitionUnknownAlias => "CACTUS-D002",
            Self::TestDefinitionInconsistentLengths => "CACTUS-D003",
            Self::Unhandled => "CACTUS-U001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// `RequestKind` — failures from the protocol client.
#[derive(Debug, thiserror::Error)]
pub enum RequestKind {
    /// Transport-level failure (connect, TLS, IO).
    #[error("[{}] transport error: {source}", ErrorCode::RequestTransport.code())]
    Transport {
        /// Underlying transport error message.
        source: String,
    },
    /// Status code was outside the set of statuses the call accepts.
    #[error("[{}] unexpected status {status} for {method} {path}", ErrorCode::RequestUnexpectedStatus.code())]
    UnexpectedStatus {
        /// HTTP method of the request.
        method: String,
        /// Request path/URI.
        path: String,
        /// Status code received.
        status: u16,
    },
    /// The response body could not be parsed into the expected payload type.
    #[error("[{}] failed to parse {kind} body: {reason}", ErrorCode::RequestParseFailure.code())]
    ParseFailure {
        /// Resource kind that was being parsed.
        kind: String,
        /// Parser error detail.
        reason: String,
    },
    /// Pagination ran past `max-pages` without the server signalling completion.
    #[error("[{}] pagination exceeded {max_pages} pages for {href}", ErrorCode::RequestPaginationOverflow.code())]
    PaginationOverflow {
        /// List href being paginated.
        href: String,
        /// Configured page limit.
        max_pages: u32,
    },
    /// A write response was missing the `Location` header it was required to carry.
    #[error("[{}] write to {href} returned no Location header", ErrorCode::RequestMissingLocation.code())]
    MissingLocation {
        /// href that was written to.
        href: String,
    },
    /// `delete-and-check` observed a status other than one of {404, 401, 403} on follow-up GET.
    #[error("[{}] delete of {href} left resource in unexpected state: {status}", ErrorCode::RequestUnexpectedStatus.code())]
    UnexpectedPostDeleteStatus {
        /// href that was deleted.
        href: String,
        /// Status observed on the follow-up GET.
        status: u16,
    },
}

/// `NotificationKind` — failures from the notification subsystem.
#[derive(Debug, thiserror::Error)]
pub enum NotificationKind {
    /// The collector service returned a failure for a request.
    #[error("[{}] collector request failed: {reason}", ErrorCode::NotificationCollectorFailure.code())]
    CollectorFailure {
        /// Human-readable failure detail.
        reason: String,
    },
    /// An action referenced an alias with no registered endpoints.
    #[error("[{}] no endpoints registered for subscription alias {alias}", ErrorCode::NotificationUnknownAlias.code())]
    UnknownAlias {
        /// The unconfigured alias.
        alias: String,
    },
}

/// `ConfigKind` — failures raised before any run begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigKind {
    /// The configuration file does not exist or could not be read.
    #[error("[{}] config file not found: {path}", ErrorCode::ConfigMissing.code())]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },
    /// The file parsed but failed semantic validation.
    #[error("[{}] config invalid: {reasons:?}", ErrorCode::ConfigInvalid.code())]
    Invalid {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
    /// A certificate or key file referenced by a client config does not exist.
    #[error("[{}] missing credential file: {path}", ErrorCode::ConfigMissingCredential.code())]
    MissingCredential {
        /// Path that was expected to exist.
        path: String,
    },
    /// The run output directory could not be created.
    #[error("[{}] could not create output directory {path}: {reason}", ErrorCode::ConfigOutputDirectory.code())]
    OutputDirectory {
        /// Directory path.
        path: String,
        /// Underlying IO error detail.
        reason: String,
    },
}

/// `TestDefinitionKind` — authoring bugs in the test procedure.
#[derive(Debug, thiserror::Error)]
pub enum TestDefinitionKind {
    /// A step parameter could not be resolved to its expected type.
    #[error("[{}] bad parameter {name} on step {step_id}: {reason}", ErrorCode::TestDefinitionBadParameter.code())]
    BadParameter {
        /// Step id the parameter belongs to.
        step_id: String,
        /// Parameter name.
        name: String,
        /// Resolution failure detail.
        reason: String,
    },
    /// A step referenced an alias (e.g. a mup-id) that was never registered.
    #[error("[{}] unknown alias {alias} on step {step_id}", ErrorCode::TestDefinitionUnknownAlias.code())]
    UnknownAlias {
        /// Step id that referenced the alias.
        step_id: String,
        /// The unresolved alias.
        alias: String,
    },
    /// Parallel value-lists had inconsistent lengths.
    #[error("[{}] inconsistent value-list lengths on step {step_id}: {lengths:?}", ErrorCode::TestDefinitionInconsistentLengths.code())]
    InconsistentLengths {
        /// Step id.
        step_id: String,
        /// The observed lengths, one per value-list key.
        lengths: Vec<(String, usize)>,
    },
}

/// `UnhandledKind` — any uncaught failure from an action or check.
#[derive(Debug, thiserror::Error)]
#[error("[{}] unhandled failure in {site}: {detail}", ErrorCode::Unhandled.code())]
pub struct UnhandledKind {
    /// Where the failure originated (e.g. `"action:insert-readings"`).
    pub site: String,
    /// Captured detail (panic message or unmodelled error).
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorCode::RequestTransport.code(), "CACTUS-Q001");
        assert_eq!(ErrorCode::Unhandled.code(), "CACTUS-U001");
    }

    #[test]
    fn request_kind_displays_code() {
        let err = RequestKind::MissingLocation {
            href: "/edev/1".into(),
        };
        assert!(err.to_string().contains("CACTUS-Q005"));
    }
}
