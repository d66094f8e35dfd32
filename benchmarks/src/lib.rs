//! Shared helpers for quarry benchmark suites.
//!
//! The scenarios here scale along the two axes that dominate planning time:
//! chain length (how many expansions a plan needs) and branching (how many
//! actions each expansion tries).

use quarry_harness::worlds::stockpile::{AtLeast, Recipe, Resource, Stock, Stockpile};
use quarry_harness::worlds::woodcutter::{self, Fact, Task, Woodcutter};
use quarry_kernel::contract::Agent;
use quarry_search::{PlanStatus, Planner};

/// Decoy task names. Decoys set facts no goal asks for.
const DECOY_NAMES: [&str; 8] = [
    "whittle", "sweep", "sharpen", "stack", "rest", "haul", "mend", "scout",
];

/// Ore goal of `amount` reachable only by unit mining: the plan is `amount`
/// actions long and the frontier never holds more than one node.
#[must_use]
pub fn ore_chain(amount: u32) -> Stockpile {
    Stockpile::new(
        Stock::default(),
        vec![AtLeast::new(Resource::Ore, amount)],
        vec![Recipe::new("mine", 1.0, Resource::Ore, 1)],
    )
}

/// Ore goal with a bulk drill alongside unit mining. With `merging` the
/// drill's precondition folds into the ore goal beneath it.
#[must_use]
pub fn ore_with_drill(amount: u32, merging: bool) -> Stockpile {
    let agent = Stockpile::new(
        Stock::default(),
        vec![AtLeast::new(Resource::Ore, amount)],
        vec![
            Recipe::new("mine", 1.0, Resource::Ore, 1),
            Recipe::new("drill", 1.5, Resource::Ore, 3).needs(Resource::Ore, 1),
        ],
    );
    if merging {
        agent.merging()
    } else {
        agent
    }
}

/// The plank chain padded with `decoys` cheap tasks that never progress the
/// goal, so every expansion pays for `decoys` extra clones and checks.
///
/// # Panics
///
/// Panics if `decoys` exceeds the number of decoy names.
#[must_use]
pub fn noisy_plank_chain(decoys: usize) -> Woodcutter {
    assert!(decoys <= DECOY_NAMES.len(), "at most {} decoys", DECOY_NAMES.len());
    let mut agent = woodcutter::plank_chain();
    agent.tasks.extend(
        DECOY_NAMES[..decoys]
            .iter()
            .map(|&name| Task::new(name, 0.25, Fact::HasGold)),
    );
    agent
}

/// Run one blocking planning call and return its status and cost.
///
/// # Panics
///
/// Panics if planning fails. Benchmark scenarios are expected to plan.
pub fn plan_once<A: Agent>(agent: &A) -> (PlanStatus, f64) {
    let plan = Planner::new(agent)
        .run()
        .expect("planning should succeed in benchmarks");
    (plan.status(), plan.cost())
}
