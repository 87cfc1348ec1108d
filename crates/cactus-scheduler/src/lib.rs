// SPDX-License-Identifier: MIT OR Apache-2.0
//! The step scheduler: a priority queue of runtime step-executions.
//!
//! Lower `primacy` runs first; among equal-primacy executions, insertion
//! order breaks the tie. The queue never blocks on its own — callers drive
//! the "sleep until the next runnable execution" behaviour themselves using
//! [`StepQueue::peek_next_no_wait`].

use cactus_model::step::StepExecution;
use std::time::{Duration, SystemTime};

/// A priority queue of pending [`StepExecution`]s.
///
/// Modelled as a plain `Vec` scanned on each call rather than a binary
/// heap: test procedures run at most a few hundred steps, so a linear scan
/// is simpler and avoids needing a total [`Ord`] over `not_before`'s
/// `Option<SystemTime>`.
#[derive(Debug, Default)]
pub struct StepQueue {
    items: Vec<StepExecution>,
}

impl StepQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Enqueue a step-execution.
    pub fn add(&mut self, execution: StepExecution) {
        self.items.push(execution);
    }

    /// Number of pending executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` iff the queue holds no executions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn lowest_primacy_executable_index(&self, now: SystemTime) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, se)| se.is_executable(now))
            .min_by_key(|(_, se)| se.primacy)
            .map(|(i, _)| i)
    }

    fn soonest_index(&self, now: SystemTime) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .min_by_key(|(_, se)| se.executable_delay(now))
            .map(|(i, _)| i)
    }

    /// The lowest-primacy execution among those executable at `now`
    /// (`not_before` unset or already past), without removing it.
    #[must_use]
    pub fn peek(&self, now: SystemTime) -> Option<&StepExecution> {
        self.lowest_primacy_executable_index(now).map(|i| &self.items[i])
    }

    /// Like [`peek`](Self::peek), but if nothing is executable yet, returns
    /// whichever queued execution has the soonest `not_before` instead of
    /// `None` — so the caller can compute how long to sleep.
    #[must_use]
    pub fn peek_next_no_wait(&self, now: SystemTime) -> Option<&StepExecution> {
        self.peek(now).or_else(|| self.soonest_index(now).map(|i| &self.items[i]))
    }

    /// Remove and return the lowest-primacy execution that is executable at
    /// `now`, if any.
    pub fn pop(&mut self, now: SystemTime) -> Option<StepExecution> {
        self.lowest_primacy_executable_index(now).map(|i| self.items.remove(i))
    }

    /// How long the caller must sleep before the next queued execution
    /// becomes runnable; zero if the queue is empty or something is already
    /// executable.
    #[must_use]
    pub fn delay_until_next(&self, now: SystemTime) -> Duration {
        self.peek_next_no_wait(now).map(|se| se.executable_delay(now)).unwrap_or_default()
    }
}
