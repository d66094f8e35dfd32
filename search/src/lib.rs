//! Quarry Search: regression best-first planning over an agent's actions.
//!
//! Given an [`Agent`](quarry_kernel::contract::Agent) with a world state,
//! candidate goals and actions, the planner finds the cheapest ordered
//! action sequence that satisfies one goal. It searches backwards: each
//! search node carries a persistent stack of outstanding goals, and an
//! action is useful only if it satisfies or progresses the goal on top.
//!
//! # Crate dependency graph
//!
//! ```text
//! quarry_kernel  ←  quarry_search  ←  quarry_harness
//! (contracts, pool)  (engine, drivers)  (worlds, config, runner)
//! ```
//!
//! # Key types
//!
//! - [`Planner`] -- builder and entry point (blocking, async, stepped)
//! - [`Plan`] -- immutable result borrowed from the agent
//! - [`Watchdog`] -- cooperative cancellation and suspension policy
//! - [`SearchEngine`] -- pooled per-call state (frontier, node and goal tables)
//! - [`PlanError`] -- contract violations and collaborator failures

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::module_name_repetitions)]

pub mod driver;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod goal_stack;
pub mod node;
pub mod plan;
pub mod policy;
pub mod trace;
pub mod watchdog;

#[cfg(test)]
mod testkit;

pub use driver::{ActiveSearch, EnginePool, PlanStepper, Planner, StepOutcome, StepperState};
pub use engine::{Expansion, SearchEngine};
pub use error::PlanError;
pub use plan::{Plan, PlanStatus, SearchStats};
pub use policy::GoalMode;
pub use trace::{TraceSink, TracingSink};
pub use watchdog::{
    poll_fn, AlwaysContinue, CancelToken, Cancellation, CostCeiling, Deadline, TimeSlice, Verdict,
    Watchdog,
};
