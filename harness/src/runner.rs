//! Config-driven planning runs producing a digestible report.
//!
//! # Pipeline
//!
//! ```text
//! PlannerConfig → Planner (goal mode, watchdog, trace)
//!   → driver (blocking | yielding | stepped) → Plan
//!   → RunReport → canonical JSON → sha256 digest
//! ```
//!
//! The report holds only values that are a pure function of the agent and
//! configuration (timing-dependent counters are left out), so two runs of
//! the same deterministic agent produce the same digest.

use std::fmt::Display;

use serde::Serialize;

use quarry_kernel::contract::Agent;
use quarry_kernel::digest::{canonical_hash, ContentHash, DOMAIN_PLAN_REPORT};
use quarry_search::driver::{Planner, StepOutcome};
use quarry_search::error::PlanError;
use quarry_search::plan::Plan;
use quarry_search::trace::TracingSink;
use quarry_search::watchdog::Watchdog;

use crate::config::{DriverKind, PlannerConfig};

/// Error during a harness run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The planner rejected its inputs or a collaborator failed.
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    /// The report could not be serialized.
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The async runtime for the yielding driver could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Deterministic summary of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub status: String,
    pub driver: String,
    pub cost: f64,
    pub goal_index: Option<usize>,
    pub goal: Option<String>,
    pub actions: Vec<String>,
    pub action_indices: Vec<usize>,
    pub expansions: u64,
    pub nodes_created: u64,
    pub goal_nodes_created: u64,
    pub frontier_high_water: u64,
}

impl RunReport {
    pub fn from_plan<A>(plan: &Plan<'_, A>, driver: DriverKind) -> Self
    where
        A: Agent,
        A::Goal: Display,
        A::Action: Display,
    {
        let stats = plan.stats();
        Self {
            status: plan.status().as_str().to_string(),
            driver: driver.as_str().to_string(),
            cost: plan.cost(),
            goal_index: plan.goal_index(),
            goal: plan.goal().map(ToString::to_string),
            actions: plan.actions().iter().map(ToString::to_string).collect(),
            action_indices: plan.action_indices().to_vec(),
            expansions: stats.expansions,
            nodes_created: stats.nodes_created,
            goal_nodes_created: stats.goal_nodes_created,
            frontier_high_water: stats.frontier_high_water,
        }
    }

    /// Canonical JSON bytes (sorted keys, compact).
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Serialize`] if serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, RunError> {
        // Round-tripping through `Value` sorts object keys.
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_vec(&value)?)
    }

    /// Digest of the canonical JSON, domain-separated.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Serialize`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, RunError> {
        Ok(canonical_hash(DOMAIN_PLAN_REPORT, &self.to_canonical_json()?))
    }

    /// The report with the driver name blanked, for comparing drivers.
    #[must_use]
    pub fn without_driver(&self) -> Self {
        Self {
            driver: String::new(),
            ..self.clone()
        }
    }
}

/// Run one planning call for `agent` as configured.
///
/// # Errors
///
/// Returns [`RunError::Plan`] for planner errors and
/// [`RunError::Runtime`] if the yielding driver cannot start its runtime.
pub fn run_plan<A>(agent: &A, config: &PlannerConfig) -> Result<RunReport, RunError>
where
    A: Agent,
    A::Goal: Display,
    A::Action: Display,
{
    let mut sink = TracingSink;
    let mut planner = Planner::new(agent)
        .goal_mode(config.goal_mode())
        .watchdog(config.watchdog.build());
    if config.trace {
        planner = planner.trace(&mut sink);
    }
    tracing::info!(
        driver = config.driver.as_str(),
        goals = agent.goals().len(),
        actions = agent.actions().len(),
        "planning run started"
    );

    let plan = match config.driver {
        DriverKind::Blocking => planner.run()?,
        DriverKind::Yielding => tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(RunError::Runtime)?
            .block_on(planner.run_async())?,
        DriverKind::Stepped => run_stepped(planner)?,
    };

    let report = RunReport::from_plan(&plan, config.driver);
    tracing::info!(
        status = %report.status,
        cost = report.cost,
        steps = report.actions.len(),
        expansions = report.expansions,
        "planning run finished"
    );
    Ok(report)
}

fn run_stepped<'a, A: Agent, D: Watchdog>(
    planner: Planner<'a, A, D>,
) -> Result<Plan<'a, A>, PlanError> {
    let mut stepper = planner.stepper();
    while stepper.step()? != StepOutcome::Done {}
    stepper.take_plan().ok_or_else(|| PlanError::FrontierInvariant {
        detail: "stepper finished without a plan".into(),
    })
}
