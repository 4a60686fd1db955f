//! Error queue for the scpi-toolkit parser.
//!
//! Provides [`ScpiError`], the `(code, info)` pair that instruments report
//! through `SYSTem:ERRor?`, and [`ErrorQueue`], the bounded FIFO that holds
//! them between the moment a command fails and the moment the controller
//! drains the queue. Error-code constants live in the [`codes`] module.

#![warn(missing_docs)]

/// SCPI-99 error-code constants used by the parser core.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries an instrument error queue retains (SCPI-99
/// requires at least 2; 10 is the conventional size).
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// A single queued SCPI error: a negative standard code (or positive
/// device-specific code) plus device-dependent info text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScpiError {
    /// SCPI error code (e.g. `-113`). Standard codes are negative.
    pub code: i16,
    /// Device-dependent info string (e.g. `"Undefined header"`).
    pub info: String,
}

impl ScpiError {
    /// Create an error from a code and info text.
    pub fn new(code: i16, info: impl Into<String>) -> Self {
        Self {
            code,
            info: info.into(),
        }
    }

    /// Returns the SCPI-99 standard name for this error's code, if it is
    /// one of the codes the parser core raises.
    pub fn standard_message(&self) -> Option<&'static str> {
        codes::standard_message(self.code)
    }
}

impl std::fmt::Display for ScpiError {
    /// Formats in the `SYSTem:ERRor?` response form: `<code>,"<info>"`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},\"{}\"", self.code, self.info)
    }
}

/// Bounded FIFO of SCPI errors.
///
/// When the queue is full, pushing evicts the oldest entry first — the
/// overflow policy is part of the instrument contract, so the queue never
/// grows beyond its capacity and never silently drops the newest error.
#[derive(Debug, Clone)]
pub struct ErrorQueue {
    entries: VecDeque<ScpiError>,
    capacity: usize,
}

impl ErrorQueue {
    /// Create a queue holding at most `capacity` entries (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an error. If the queue is full, the oldest entry is evicted
    /// and returned.
    pub fn push(&mut self, error: ScpiError) -> Option<ScpiError> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(error);
        evicted
    }

    /// Remove and return the oldest error, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<ScpiError> {
        self.entries.pop_front()
    }

    /// Number of queued errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no errors are queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries this queue retains.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all queued errors (`*CLS` semantics).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ErrorQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
