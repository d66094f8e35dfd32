//! Goal selection policy.

use std::ops::Range;

use crate::error::PlanError;

/// Which candidate goals seed the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalMode {
    /// Plan for the candidate goal at this index only.
    Single(usize),
    /// Seed one `Start` node per candidate goal; the cheapest plan to any
    /// of them wins.
    CheapestOf,
}

impl Default for GoalMode {
    fn default() -> Self {
        Self::Single(0)
    }
}

impl GoalMode {
    /// Candidate indices to seed, given `count` candidate goals.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EmptyGoalSet`] if `count` is zero, or
    /// [`PlanError::GoalIndexOutOfRange`] if a single index is not below
    /// `count`.
    pub fn candidates(self, count: usize) -> Result<Range<usize>, PlanError> {
        if count == 0 {
            return Err(PlanError::EmptyGoalSet);
        }
        match self {
            Self::Single(index) if index < count => Ok(index..index + 1),
            Self::Single(index) => Err(PlanError::GoalIndexOutOfRange { index, count }),
            Self::CheapestOf => Ok(0..count),
        }
    }
}
