// SPDX-License-Identifier: MIT OR Apache-2.0
//! Request/response observation hooks.
//!
//! The protocol client never owns the response log or the "active request"
//! slot itself — those belong to the response tracker, which lives
//! above this crate. Instead every call accepts a [`RequestObserver`]: the
//! client announces a request before it is issued and reports the finished
//! [`RequestRecord`] once a response (or terminal failure) is in hand.

use crate::validate::ValidationResult;
use std::sync::Arc;
use std::time::Duration;

/// Identifies a request before it has been issued, so the tracker can
/// record it as the harness's single "active request".
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Alias of the client issuing the request.
    pub client_alias: String,
    /// Owning step id, for correlation in the requests timeline.
    pub step_id: String,
    /// HTTP method as a string (`"GET"`, `"POST"`, …).
    pub method: String,
    /// Request path (including query string).
    pub path: String,
}

/// A completed request/response pair, as surfaced in the requests timeline
/// and consulted by the results evaluator for XSD errors.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// The request this record reports on.
    pub descriptor: RequestDescriptor,
    /// Zero-indexed rate-limit retry attempt number this record reflects
    /// (`0` for the first attempt).
    pub attempt: u32,
    /// Status code received, or `None` on a transport failure.
    pub status: Option<u16>,
    /// Raw request body, if any.
    pub request_body: Option<String>,
    /// Raw response body, if any.
    pub response_body: Option<String>,
    /// Validation outcome for the response body, if one was validated.
    pub validation: Option<ValidationResult>,
    /// Wall-clock time this attempt took.
    pub duration: Duration,
}

/// Observes the lifecycle of protocol-client requests.
pub trait RequestObserver: Send + Sync {
    /// Called immediately before a request attempt is issued.
    fn before_request(&self, descriptor: &RequestDescriptor, attempt: u32) {
        let _ = (descriptor, attempt);
    }

    /// Called once an attempt's outcome (success, non-2xx, or transport
    /// failure) is known.
    fn after_request(&self, record: RequestRecord) {
        let _ = record;
    }
}

/// The out-of-the-box observer: requests are logged via `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn before_request(&self, descriptor: &RequestDescriptor, attempt: u32) {
        tracing::debug!(
            target: "cactus.protocol",
            client = %descriptor.client_alias,
            step = %descriptor.step_id,
            method = %descriptor.method,
            path = %descriptor.path,
            attempt,
            "issuing request"
        );
    }

    fn after_request(&self, record: RequestRecord) {
        tracing::debug!(
            target: "cactus.protocol",
            client = %record.descriptor.client_alias,
            step = %record.descriptor.step_id,
            status = ?record.status,
            duration_ms = record.duration.as_millis() as u64,
            "request completed"
        );
    }
}

/// Shared handle to a [`RequestObserver`], as stored on [`crate::client::ProtocolClient`].
pub type SharedObserver = Arc<dyn RequestObserver>;
