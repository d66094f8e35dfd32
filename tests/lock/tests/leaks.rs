//! Pooling discipline: every world clone comes back on every exit path.
//!
//! Each test wraps an agent in `Ledgered` and checks the outstanding count
//! after the call, whether the call found a plan, found nothing, was
//! cancelled, failed, or was abandoned half-way.

use std::fmt;

use quarry_harness::ledger::Ledgered;
use quarry_harness::worlds::stockpile::{self, AtLeast, Recipe, Resource, Stock};
use quarry_harness::worlds::woodcutter;
use quarry_kernel::contract::{Action, Agent, Goal, Satisfaction};
use quarry_kernel::pool::Pool;
use quarry_search::{
    poll_fn, CancelToken, CostCeiling, EnginePool, PlanError, PlanStatus, Planner, StepOutcome,
    Verdict,
};

// ---------------------------------------------------------------------------
// A stockpile variant whose collaborators can be told to misbehave.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    Healthy,
    PanicInEffect,
    PanicInGoal,
    NanCost,
}

#[derive(Debug, Clone)]
struct Touchy {
    inner: AtLeast,
    fault: Fault,
}

impl Goal<Stock> for Touchy {
    fn check_and_try_satisfy(&self, before: &Stock, now: &mut Stock) -> Satisfaction {
        assert!(self.fault != Fault::PanicInGoal, "goal check exploded");
        self.inner.check_and_try_satisfy(before, now)
    }
}

#[derive(Debug, Clone)]
struct Brittle {
    inner: Recipe,
    fault: Fault,
}

impl Action<Stock, Touchy> for Brittle {
    fn required_goal(&self) -> Option<Touchy> {
        self.inner.needs.map(|inner| Touchy {
            inner,
            fault: self.fault,
        })
    }

    fn cost(&self) -> f64 {
        if self.fault == Fault::NanCost {
            f64::NAN
        } else {
            self.inner.cost
        }
    }

    fn apply_effect(&self, world: &mut Stock) {
        assert!(self.fault != Fault::PanicInEffect, "effect exploded");
        self.inner.apply_effect(world);
    }
}

impl fmt::Display for Brittle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[derive(Debug)]
struct Workshop {
    world: Option<Stock>,
    goals: Vec<Touchy>,
    actions: Vec<Brittle>,
}

impl Agent for Workshop {
    type World = Stock;
    type Goal = Touchy;
    type Action = Brittle;

    fn world(&self) -> Option<&Stock> {
        self.world.as_ref()
    }

    fn goals(&self) -> &[Touchy] {
        &self.goals
    }

    fn actions(&self) -> &[Brittle] {
        &self.actions
    }
}

/// Ore goal reached by mining; the drill misbehaves as told. The drill is
/// tried after `mine`, so its fault fires with a child already queued.
fn workshop(fault: Fault) -> Ledgered<Workshop> {
    Ledgered::new(Workshop {
        world: Some(Stock::default()),
        goals: vec![Touchy {
            inner: AtLeast::new(Resource::Ore, 3),
            fault: Fault::Healthy,
        }],
        actions: vec![
            Brittle {
                inner: Recipe::new("mine", 1.0, Resource::Ore, 1),
                fault: Fault::Healthy,
            },
            Brittle {
                inner: Recipe::new("drill", 1.0, Resource::Coal, 1).needs(Resource::Coal, 1),
                fault,
            },
            Brittle {
                inner: Recipe::new("burn", 1.0, Resource::Coal, 1),
                fault: Fault::Healthy,
            },
        ],
    })
}

fn assert_balanced<A: Agent>(agent: &Ledgered<A>) {
    let ledger = agent.snapshot();
    assert_eq!(ledger.outstanding_worlds(), 0, "{ledger:?}");
    assert!(ledger.world_clones > 0, "the call did some work");
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[test]
fn found_plan_returns_every_clone() {
    let agent = Ledgered::new(woodcutter::fire_or_planks());
    let plan = Planner::new(&agent).cheapest_of_goals().run().unwrap();
    assert_eq!(plan.status(), PlanStatus::FoundPlan);
    let reported = plan.stats().worlds_released;
    drop(plan);
    assert_eq!(agent.snapshot().world_returns, reported);
    assert_balanced(&agent);
}

#[test]
fn not_found_returns_every_clone() {
    let agent = Ledgered::new(woodcutter::broke_without_axe());
    let plan = Planner::new(&agent).run().unwrap();
    assert_eq!(plan.status(), PlanStatus::NotFound);
    assert_eq!(plan.stats().worlds_released, agent.snapshot().world_returns);
    drop(plan);
    assert_balanced(&agent);
}

#[test]
fn cancelled_search_sweeps_the_frontier() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    let plan = Planner::new(&agent)
        .watchdog(CostCeiling::new(4.0))
        .run()
        .unwrap();
    assert_eq!(plan.status(), PlanStatus::Cancelled);
    let reported = plan.stats().worlds_released;
    drop(plan);
    assert_eq!(agent.snapshot().world_returns, reported);
    assert_balanced(&agent);
}

#[test]
fn released_count_includes_swept_clones() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    let plan = Planner::new(&agent)
        .watchdog(CostCeiling::new(2.0))
        .run()
        .unwrap();
    assert_eq!(plan.status(), PlanStatus::Cancelled);
    let stats = *plan.stats();
    drop(plan);
    let ledger = agent.snapshot();
    assert!(stats.expansions > 0);
    assert_eq!(ledger.world_returns, ledger.world_clones);
    assert_eq!(stats.worlds_released, ledger.world_returns);
}

#[test]
fn cancel_token_from_another_thread() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    let token = CancelToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    let plan = Planner::new(&agent)
        .watchdog(token.watchdog())
        .run()
        .unwrap();
    assert_eq!(plan.status(), PlanStatus::Cancelled);
    assert_eq!(plan.stats().expansions, 0);
    drop(plan);
    assert_balanced(&agent);
}

#[test]
fn cancel_after_accepting_node_keeps_cheapest() {
    let agent = Ledgered::new(woodcutter::plank_chain());
    let mut polls = 0;
    let plan = Planner::new(&agent)
        .watchdog(poll_fn(|_| {
            polls += 1;
            if polls > 2 {
                Verdict::Cancel
            } else {
                Verdict::Continue
            }
        }))
        .run()
        .unwrap();
    assert_eq!(plan.status(), PlanStatus::CancelledButFound);
    assert!(plan.is_usable());
    assert_eq!(plan.action_indices(), &[1, 0]);
    drop(plan);
    assert_balanced(&agent);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn panicking_effect_fails_without_leaks() {
    let agent = workshop(Fault::PanicInEffect);
    let err = Planner::new(&agent).run().unwrap_err();
    assert_eq!(
        err,
        PlanError::ActionEffectFailed {
            action: 1,
            detail: "effect exploded".into()
        }
    );
    assert!(!err.is_contract_violation());
    assert_balanced(&agent);
}

#[test]
fn panicking_goal_check_fails_without_leaks() {
    // The panicking goal is smelt's precondition; the top-level goal is
    // well-behaved, so the fault fires one level down.
    let agent = Ledgered::new(Workshop {
        world: Some(Stock::default()),
        goals: vec![Touchy {
            inner: AtLeast::new(Resource::Ingot, 1),
            fault: Fault::Healthy,
        }],
        actions: vec![
            Brittle {
                inner: Recipe::new("smelt", 1.0, Resource::Ingot, 1).needs(Resource::Ore, 1),
                fault: Fault::PanicInGoal,
            },
            Brittle {
                inner: Recipe::new("mine", 1.0, Resource::Ore, 1),
                fault: Fault::Healthy,
            },
        ],
    });
    let err = Planner::new(&agent).run().unwrap_err();
    assert!(
        matches!(err, PlanError::InvalidSatisfactionResult { action: 0, .. }),
        "{err:?}"
    );
    assert_balanced(&agent);
}

#[test]
fn invalid_cost_fails_without_leaks() {
    let agent = workshop(Fault::NanCost);
    let err = Planner::new(&agent).run().unwrap_err();
    assert!(
        matches!(err, PlanError::InvalidActionCost { action: 1, cost } if cost.is_nan()),
        "{err:?}"
    );
    assert_balanced(&agent);
}

#[test]
fn panicking_watchdog_fails_without_leaks() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    let mut polls = 0;
    let err = Planner::new(&agent)
        .watchdog(poll_fn(|_| {
            polls += 1;
            assert!(polls < 5, "watchdog gave up");
            Verdict::Continue
        }))
        .run()
        .unwrap_err();
    assert_eq!(
        err,
        PlanError::InvalidWatchdogResult {
            detail: "watchdog gave up".into()
        }
    );
    assert_balanced(&agent);
}

// ---------------------------------------------------------------------------
// Abandonment and engine reuse
// ---------------------------------------------------------------------------

#[test]
fn abandoned_stepper_sweeps_on_drop() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    let pool: EnginePool<Ledgered<stockpile::Stockpile>> = Pool::new();
    {
        let mut stepper = Planner::new(&agent).pool(&pool).stepper();
        for _ in 0..5 {
            assert_eq!(stepper.step(), Ok(StepOutcome::Pending));
        }
        assert!(agent.snapshot().outstanding_worlds() > 0);
    }
    assert_balanced(&agent);
    assert_eq!(pool.idle(), 1);
}

#[test]
fn abandoned_active_search_sweeps_on_drop() {
    let agent = Ledgered::new(stockpile::forge_one_tool());
    {
        let mut search = Planner::new(&agent).begin().unwrap();
        search.step().unwrap();
        search.step().unwrap();
    }
    assert_balanced(&agent);
}

#[test]
fn engine_is_reused_across_calls() {
    let agent = Ledgered::new(woodcutter::plank_chain());
    let pool: EnginePool<Ledgered<woodcutter::Woodcutter>> = Pool::new();
    for _ in 0..4 {
        let plan = Planner::new(&agent).pool(&pool).run().unwrap();
        assert_eq!(plan.action_indices(), &[1, 0]);
    }
    let stats = pool.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.reused, 3);
    assert_eq!(stats.idle, 1);
    assert_balanced(&agent);
}

#[test]
fn concurrent_calls_share_the_process_pool() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let agent = Ledgered::new(stockpile::forge_one_tool());
                let plan = Planner::new(&agent).run().unwrap();
                let cost = plan.cost();
                drop(plan);
                assert_eq!(agent.snapshot().outstanding_worlds(), 0);
                cost
            })
        })
        .collect();
    let costs: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(costs.windows(2).all(|w| w[0].to_bits() == w[1].to_bits()));
}
