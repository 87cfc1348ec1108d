// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-protocol
//!
//! The mutually-authenticated XML/HTTP protocol client: the five
//! (really seven, counting pagination and delete-and-check) public
//! operations every action builds on, a fixed rate-limit retry schedule, a
//! pluggable body validator standing in for XSD validation, and the
//! request/response observer hooks the response tracker attaches
//! to.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The protocol client and its request/response types.
pub mod client;
/// List pagination.
pub mod pagination;
/// List-request query-string construction.
pub mod query;
/// Rate-limit retry schedule.
pub mod retry;
/// Request/response observer hooks.
pub mod tracker;
/// Pluggable response-body validation.
pub mod validate;

pub use client::{ClientErrorOrEmptyList, ProtocolClient, RawResponse, RequestContext, SubmitOutcome, PROTOCOL_MIME};
pub use pagination::{paginate_list, PaginateOutcome, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
pub use query::ListQuery;
pub use retry::{delay_for_attempt, RATE_LIMIT_SCHEDULE};
pub use tracker::{RequestDescriptor, RequestObserver, RequestRecord, SharedObserver, TracingObserver};
pub use validate::{BodyValidator, NoopValidator, ValidationResult};
