// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-notify
//!
//! The notification/webhook subsystem: a per-client context that
//! registers collector endpoints, collects and decodes delivered
//! notifications into the resource store, and tears endpoints down on
//! shutdown without ever failing the teardown itself.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collector;
mod context;
mod decode;
mod envelope;

pub use collector::{CollectorClient, CreatedEndpoint};
pub use context::{CollectOutcome, Endpoint, NotificationsContext};
pub use decode::{decode_resource_xml, DecodedResource};
pub use envelope::parse_notification;
