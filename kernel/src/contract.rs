//! Collaborator contracts consumed by the planner.
//!
//! The planner never inspects a world state. It clones worlds, applies
//! action effects to the clones, asks the head goal how the transition
//! went, and hands clones back to the agent once it is done with them.
//!
//! Optional capabilities (world pooling, goal pooling, goal merging) are
//! default methods on [`Agent`]. The defaults behave as "capability absent":
//! plain `Clone`, plain drop, no merge. Because the planner is generic over
//! the agent type, every capability combination is monomorphized.

use std::fmt;

/// Three-valued feedback from a goal about one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Satisfaction {
    /// The transition fully discharged the goal.
    Satisfied,
    /// The transition moved toward the goal without completing it.
    Progressed,
    /// The transition is irrelevant to the goal.
    NotProgressed,
}

/// A satisfaction predicate over world state `W`.
pub trait Goal<W>: fmt::Debug {
    /// Compare `before` and `now` (the state after one action effect).
    ///
    /// A goal may mutate `now` to consume whatever state satisfied it, so
    /// that goals further down the stack cannot reuse it.
    fn check_and_try_satisfy(&self, before: &W, now: &mut W) -> Satisfaction;
}

/// A state transformer with a non-negative cost and an optional precondition.
pub trait Action<W, G>: fmt::Debug {
    /// The goal that must hold before this action can run, if any.
    ///
    /// Called only when the action is relevant to the current head goal,
    /// so an agent that pools goals may hand out a recycled value here.
    fn required_goal(&self) -> Option<G>;

    /// Cost of running the action. Must be finite and `>= 0`.
    fn cost(&self) -> f64;

    /// Apply the action's effect in place.
    fn apply_effect(&self, world: &mut W);
}

/// Declared optional capabilities, used for diagnostics only.
///
/// The planner always calls the capability methods; an agent that does not
/// override them gets the "absent" behavior. These flags only let traces
/// report which configuration a run used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub pools_worlds: bool,
    pub pools_goals: bool,
    pub merges_goals: bool,
}

/// The data provider the planner plans for.
///
/// # Contract
///
/// - `world()` returns the current world state, or `None` if the agent has
///   none (the planner refuses to start).
/// - `goals()` and `actions()` must be non-empty.
/// - Every value passed to `return_world` / `return_goal` was produced by
///   `clone_world` / `clone_goal` / [`Action::required_goal`] /
///   `try_merge` during the same call, and is returned exactly once.
pub trait Agent {
    /// World state snapshot. `Send + 'static` so engine buffers holding
    /// clones can live in the process-wide engine pool.
    type World: Clone + Send + 'static;
    /// Goal values stored in the goal-stack table.
    type Goal: Goal<Self::World> + Clone + Send + 'static;
    /// Available actions.
    type Action: Action<Self::World, Self::Goal>;

    /// Current world state.
    fn world(&self) -> Option<&Self::World>;

    /// Candidate goals, in priority order.
    fn goals(&self) -> &[Self::Goal];

    /// Available actions.
    fn actions(&self) -> &[Self::Action];

    /// Deep-clone a world state. Override to hand out pooled buffers.
    fn clone_world(&self, world: &Self::World) -> Self::World {
        world.clone()
    }

    /// Take back a world clone the planner no longer needs.
    fn return_world(&self, world: Self::World) {
        drop(world);
    }

    /// Clone a candidate goal into the planner's goal table.
    fn clone_goal(&self, goal: &Self::Goal) -> Self::Goal {
        goal.clone()
    }

    /// Take back a goal value the planner no longer needs.
    fn return_goal(&self, goal: Self::Goal) {
        drop(goal);
    }

    /// Merge a newly required goal into the current top goal.
    ///
    /// A merged goal must be at least as restrictive as the conjunction of
    /// both inputs. Returning `None` is always sound.
    fn try_merge(&self, top: &Self::Goal, required: &Self::Goal) -> Option<Self::Goal> {
        let _ = (top, required);
        None
    }

    /// Which optional capabilities this agent overrides.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}
