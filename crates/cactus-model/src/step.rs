// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step definitions and runtime step-executions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// A resolved parameter value. Test procedures are authored as data (TOML
/// or JSON, depending on the out-of-scope config format), so parameters
/// arrive as a small dynamic value tree rather than typed Rust structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A boolean parameter.
    Bool(bool),
    /// An integer parameter.
    Int(i64),
    /// A floating-point parameter.
    Float(f64),
    /// A string parameter.
    String(String),
    /// A list of parameter values (used for value-lists and kind lists).
    List(Vec<ParamValue>),
    /// A nested map (used for per-reading-type value maps).
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// View as a string, if this value is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// View as a bool, if this value is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// View as an i64, if this value is an int.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// View as a list, if this value is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// View as a map, if this value is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A map of resolved parameters, as handed to an action or check handler.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A type + resolved-parameter pair, used for both actions and checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    /// The registered action/check type name (dispatch key).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resolved parameters for this invocation.
    #[serde(default)]
    pub params: ParamMap,
}

/// A single step of a test procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Stable step identifier (unique within a procedure).
    pub id: String,
    /// The action to execute.
    pub action: Invocation,
    /// Zero or more checks to run after the action completes.
    #[serde(default)]
    pub checks: Vec<Invocation>,
    /// If set, a failing step is retried rather than halting the run.
    #[serde(default)]
    pub repeat_until_pass: bool,
}

/// A runtime record of one (possibly repeated/retried) execution of a [`Step`].
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// The step being executed.
    pub step: Step,
    /// Alias of the client that owns/drives this step.
    pub owning_client_alias: String,
    /// Alias of the client whose resources this step's action targets
    /// (usually equal to `owning_client_alias`, but distinct for
    /// cross-client scenarios).
    pub resource_owning_client_alias: String,
    /// Scheduler priority; lower runs first.
    pub primacy: i64,
    /// Zero-indexed repeat counter (incremented when an action requests
    /// `repeat`).
    pub repeat_number: u32,
    /// Earliest wall-clock time this execution may run, if any.
    pub not_before: Option<SystemTime>,
    /// Number of retry attempts so far (incremented on `repeat-until-pass`
    /// failures; reset to zero on a successful repeat).
    pub attempts: u32,
}

impl StepExecution {
    /// Construct the first (zeroth) execution of `step`.
    #[must_use]
    pub fn first(step: Step, owning_client_alias: String, primacy: i64) -> Self {
        let resource_owning_client_alias = owning_client_alias.clone();
        Self {
            step,
            owning_client_alias,
            resource_owning_client_alias,
            primacy,
            repeat_number: 0,
            not_before: None,
            attempts: 0,
        }
    }

    /// How long (if at all) this execution must still wait before `now`.
    #[must_use]
    pub fn executable_delay(&self, now: SystemTime) -> std::time::Duration {
        match self.not_before {
            Some(nb) if nb > now => nb.duration_since(now).unwrap_or_default(),
            _ => std::time::Duration::ZERO,
        }
    }

    /// `true` iff this execution could run immediately at `now`.
    #[must_use]
    pub fn is_executable(&self, now: SystemTime) -> bool {
        self.executable_delay(now).is_zero()
    }
}
