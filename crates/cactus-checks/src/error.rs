// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error aggregation for check execution.

use cactus_error::TestDefinitionKind;

/// Any uncaught failure from a check: on an uncaught failure, the engine
/// records the exception and terminates the run. Checks are pure reads
/// over the store, so the only failure mode is a malformed test
/// definition (an unresolvable alias or a badly-shaped parameter).
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The step's parameters were malformed or referenced an unknown alias.
    #[error(transparent)]
    TestDefinition(#[from] TestDefinitionKind),
}
