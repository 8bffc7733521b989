//! Structured per-item results for batch stages.
//!
//! Vectorize and normalize are best-effort batches: a failed item never
//! aborts its siblings. Instead of side-effect logging, every item ends
//! up in a [`BatchReport`] as either the elapsed milliseconds or the
//! failure cause, so partial failure is inspectable and testable.

use serde::{Deserialize, Serialize};

/// The outcome of processing one file in a batch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Source file name the outcome is attributable to.
    pub name: String,
    /// Elapsed milliseconds on success, failure cause on error.
    pub result: Result<u64, String>,
}

impl ItemOutcome {
    pub fn succeeded(name: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            name: name.into(),
            result: Ok(elapsed_ms),
        }
    }

    pub fn failed(name: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: Err(cause.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated outcomes for one batch stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(cause) => Some((o.name.as_str(), cause.as_str())),
        })
    }

    /// One-line end-of-batch summary.
    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded(), self.failed())
    }
}
