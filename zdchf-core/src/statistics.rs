//! Pass/fail counters for a filtering run.

use crate::filter::Decision;
use serde::{Deserialize, Serialize};

/// Counts of processed, accepted and rejected events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStatistics {
    /// Events evaluated.
    pub processed: u64,
    /// Events that passed.
    pub accepted: u64,
    /// Events rejected as pileup.
    pub rejected: u64,
}

impl FilterStatistics {
    /// Records one decision.
    pub fn record(&mut self, accepted: bool) {
        self.processed += 1;
        if accepted {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }

    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &Self) {
        self.processed += other.processed;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
    }

    /// Builds counters from a slice of decisions.
    #[must_use]
    pub fn from_decisions(decisions: &[Decision]) -> Self {
        let mut stats = Self::default();
        for decision in decisions {
            stats.record(decision.accepted);
        }
        stats
    }

    /// Fraction of processed events that passed, or `None` if none were seen.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_fraction(&self) -> Option<f64> {
        if self.processed == 0 {
            None
        } else {
            Some(self.accepted as f64 / self.processed as f64)
        }
    }
}
