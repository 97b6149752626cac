//! The comparison contract the chunk store is written against.

use twinpane_types::Change;

/// How much work a diff may spend before settling for a coarser result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffBudget {
    /// Upper bound on comparison effort. Engines interpret it as a scan
    /// limit; exceeding it degrades precision, never correctness.
    pub effort_limit: usize,
}

impl DiffBudget {
    pub const fn new(effort_limit: usize) -> Self {
        Self { effort_limit }
    }

    /// Whether comparing `len_a` items against `len_b` items needs more
    /// than `effort_limit²` steps.
    pub fn is_exceeded_by(&self, len_a: usize, len_b: usize) -> bool {
        let limit = self.effort_limit as u128;
        len_a as u128 * len_b as u128 > limit * limit
    }
}

impl Default for DiffBudget {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Turns two strings into character-level changes.
///
/// Implementations must return changes over raw byte offsets that lie on
/// character boundaries, sorted ascending and non-overlapping. When the
/// budget is exceeded an engine may return a single change covering the
/// whole differing region. Diffing never fails.
pub trait DiffEngine: Send + Sync {
    fn diff(&self, a: &str, b: &str, budget: DiffBudget) -> Vec<Change>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_bounds_the_comparison_grid() {
        let budget = DiffBudget::new(3);
        assert!(!budget.is_exceeded_by(3, 3));
        assert!(budget.is_exceeded_by(2, 5));
        assert!(!budget.is_exceeded_by(0, 1_000_000));
    }
}
