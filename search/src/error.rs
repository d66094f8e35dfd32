//! Typed planner errors.
//!
//! `PlanError` covers contract violations (rejected before any search work),
//! broken collaborators (fatal, raised mid-search), and misuse of the
//! step-driven driver. Operational outcomes such as "no plan" or
//! "cancelled" are NOT errors: they are [`crate::plan::PlanStatus`] values.
//!
//! Every error path still runs the pooling sweep, so no world-state or goal
//! value leaks on error exits.

/// Failure of a planning call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The agent supplied no candidate goals.
    #[error("agent supplied no candidate goals")]
    EmptyGoalSet,

    /// The agent supplied no actions.
    #[error("agent supplied no actions")]
    EmptyActionSet,

    /// The agent has no current world state.
    #[error("agent has no current world state")]
    NullWorldState,

    /// Single-goal mode selected a goal the agent does not have.
    #[error("goal index {index} out of range for {count} candidate goals")]
    GoalIndexOutOfRange { index: usize, count: usize },

    /// An action reported a negative, NaN or infinite cost.
    #[error("action {action} reported invalid cost {cost}")]
    InvalidActionCost { action: usize, cost: f64 },

    /// A goal failed to produce a satisfaction result (it panicked).
    #[error("goal check failed after action {action}: {detail}")]
    InvalidSatisfactionResult { action: usize, detail: String },

    /// The watchdog failed to produce a verdict (it panicked).
    #[error("watchdog poll failed: {detail}")]
    InvalidWatchdogResult { detail: String },

    /// An action's effect panicked.
    #[error("action {action} failed to apply its effect: {detail}")]
    ActionEffectFailed { action: usize, detail: String },

    /// An internal node-table or frontier invariant was violated.
    #[error("frontier invariant violated: {detail}")]
    FrontierInvariant { detail: String },

    /// The step-driven driver was stepped after it completed.
    #[error("planner already finalized")]
    AlreadyFinalized,

    /// The step-driven driver was stepped after it was disposed.
    #[error("planner was disposed")]
    Disposed,
}

impl PlanError {
    /// Whether this error was raised before any search work began.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyGoalSet
                | Self::EmptyActionSet
                | Self::NullWorldState
                | Self::GoalIndexOutOfRange { .. }
        )
    }

    /// Whether this error is driver misuse rather than a planning failure.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::AlreadyFinalized | Self::Disposed)
    }
}

/// Render a caught panic payload for error details.
pub(crate) fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
