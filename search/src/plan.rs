//! The result of a planning call.

use std::fmt;

use quarry_kernel::contract::Agent;

/// How a planning call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanStatus {
    /// An accepting node was popped; the plan is optimal for non-negative
    /// costs.
    FoundPlan,
    /// The frontier emptied without reaching an accepting node.
    NotFound,
    /// Cancelled before any accepting node was queued.
    Cancelled,
    /// Cancelled after an accepting node was queued; the plan is the
    /// cheapest one known at cancellation time, not necessarily optimal.
    CancelledButFound,
}

impl PlanStatus {
    /// Stable lowercase name, used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FoundPlan => "found_plan",
            Self::NotFound => "not_found",
            Self::Cancelled => "cancelled",
            Self::CancelledButFound => "cancelled_but_found",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected during one planning call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontier pops.
    pub expansions: u64,
    /// Search nodes created, including `Start` and `End` nodes.
    pub nodes_created: u64,
    /// Goal nodes created in the goal-stack table.
    pub goal_nodes_created: u64,
    /// Largest frontier size observed.
    pub frontier_high_water: u64,
    /// Watchdog suspensions.
    pub suspensions: u64,
    /// World clones handed back to the agent. On a finished plan this
    /// includes the clones the final sweep returns from the frontier.
    pub worlds_released: u64,
}

/// An immutable plan borrowed from the agent it was computed for.
///
/// Actions are in execution order.
pub struct Plan<'a, A: Agent> {
    status: PlanStatus,
    cost: f64,
    goal_index: Option<usize>,
    goal: Option<&'a A::Goal>,
    action_indices: Vec<usize>,
    actions: Vec<&'a A::Action>,
    stats: SearchStats,
}

impl<'a, A: Agent> Plan<'a, A> {
    /// A plan without actions (`NotFound` / `Cancelled`).
    pub(crate) fn empty(status: PlanStatus, stats: SearchStats) -> Self {
        Self {
            status,
            cost: 0.0,
            goal_index: None,
            goal: None,
            action_indices: Vec::new(),
            actions: Vec::new(),
            stats,
        }
    }

    /// A plan reaching candidate goal `goal_index` through `action_indices`.
    pub(crate) fn found(
        agent: &'a A,
        status: PlanStatus,
        cost: f64,
        goal_index: usize,
        action_indices: Vec<usize>,
        stats: SearchStats,
    ) -> Self {
        let all = agent.actions();
        let actions = action_indices.iter().map(|&i| &all[i]).collect();
        Self {
            status,
            cost,
            goal_index: Some(goal_index),
            goal: agent.goals().get(goal_index),
            action_indices,
            actions,
            stats,
        }
    }

    #[must_use]
    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// `true` for `FoundPlan` and `CancelledButFound`.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(
            self.status,
            PlanStatus::FoundPlan | PlanStatus::CancelledButFound
        )
    }

    /// Total cost; `0.0` when no plan was found.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The candidate goal this plan reaches.
    #[must_use]
    pub fn goal(&self) -> Option<&'a A::Goal> {
        self.goal
    }

    /// Index of the reached goal in the agent's candidate list.
    #[must_use]
    pub fn goal_index(&self) -> Option<usize> {
        self.goal_index
    }

    /// Actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[&'a A::Action] {
        &self.actions
    }

    /// Indices of the actions into the agent's action list.
    #[must_use]
    pub fn action_indices(&self) -> &[usize] {
        &self.action_indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

impl<A: Agent> fmt::Debug for Plan<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("status", &self.status)
            .field("cost", &self.cost)
            .field("goal", &self.goal)
            .field("actions", &self.actions)
            .field("stats", &self.stats)
            .finish()
    }
}
