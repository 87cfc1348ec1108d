// SPDX-License-Identifier: MIT OR Apache-2.0
//! cactus-model
//!
//! The shared data model for the cactus conformance harness: the closed set
//! of protocol resource kinds and the static resource tree, stored
//! resource identifiers and payloads, client/server configuration, and
//! step/step-execution types.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Client and server configuration types.
pub mod config;
/// Stored-resource identifiers.
pub mod id;
/// The resource kind enum and the static resource tree.
pub mod kind;
/// Wire payload types for every storable resource kind.
pub mod payload;
/// Stored resources and their side-table annotations.
pub mod resource;
/// Step and step-execution types.
pub mod step;

pub use config::{ClientConfig, Role, ServerConfig};
pub use id::ResourceId;
pub use kind::{walk_plan, ResourceKind};
pub use resource::{Annotations, StoredResource};
pub use step::{Invocation, ParamMap, ParamValue, Step, StepExecution};
