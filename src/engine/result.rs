//! Per-phase result records.

use crate::{CheckOutcome, Phase};
use serde::Serialize;

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub passed: u32,
    pub warned: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
}

/// Outcome of one executed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRecord {
    pub id: String,
    pub message: String,
    pub outcome: CheckOutcome,
}

/// Checks run in one phase, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub checks: Vec<CheckRecord>,
    summary: PhaseSummary,
}

impl PhaseReport {
    /// Create an empty report for `phase`
    pub fn new(phase: Phase) -> Self {
        PhaseReport {
            phase,
            checks: Vec::new(),
            summary: PhaseSummary::default(),
        }
    }

    /// Record the outcome of a check
    pub fn record(&mut self, id: &str, message: &str, outcome: CheckOutcome) {
        self.summary.total += 1;
        match outcome {
            CheckOutcome::Passed => self.summary.passed += 1,
            CheckOutcome::Warned => self.summary.warned += 1,
            CheckOutcome::FailedFatal => self.summary.failed += 1,
            CheckOutcome::Skipped => self.summary.skipped += 1,
        }
        self.checks.push(CheckRecord {
            id: id.to_string(),
            message: message.to_string(),
            outcome,
        });
    }

    /// Summary statistics
    pub fn summary(&self) -> PhaseSummary {
        self.summary.clone()
    }

    /// Outcome of the check with `id`, if it ran
    pub fn outcome_of(&self, id: &str) -> Option<CheckOutcome> {
        self.checks.iter().find(|c| c.id == id).map(|c| c.outcome)
    }

    /// IDs of the checks that ran, in order
    pub fn check_ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id.as_str()).collect()
    }

    /// Whether no check ran in this phase
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether any check ended as a warning
    pub fn has_warnings(&self) -> bool {
        self.summary.warned > 0
    }
}
