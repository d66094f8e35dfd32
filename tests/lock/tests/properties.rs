//! Property tests over randomly generated stockpile agents.
//!
//! Every run is bounded by a cost ceiling and a poll budget, since random
//! recipes can form precondition cycles that never exhaust the frontier.

use proptest::prelude::*;

use quarry_harness::ledger::Ledgered;
use quarry_harness::worlds::stockpile::{AtLeast, Recipe, Resource, Stock, Stockpile};
use quarry_kernel::contract::{Action, Agent, Goal, Satisfaction};
use quarry_search::{poll_fn, CostCeiling, PlanStatus, Planner, Verdict, Watchdog};

const POLL_BUDGET: usize = 2_000;
const COST_CEILING: f64 = 14.0;

fn arb_resource() -> impl Strategy<Value = Resource> {
    prop::sample::select(Resource::ALL.to_vec())
}

fn arb_recipe() -> impl Strategy<Value = Recipe> {
    (
        arb_resource(),
        1u32..=3,
        1u32..=4,
        prop::option::of((arb_resource(), 1u32..=2)),
    )
        .prop_map(|(output, yields, cost, needs)| {
            let recipe = Recipe::new("recipe", f64::from(cost), output, yields);
            match needs {
                Some((resource, amount)) => recipe.needs(resource, amount),
                None => recipe,
            }
        })
}

fn arb_stockpile() -> impl Strategy<Value = Stockpile> {
    (
        prop::collection::vec(arb_recipe(), 1..=4),
        prop::collection::vec((arb_resource(), 1u32..=3), 1..=2),
        prop::collection::vec(0u32..=2, 4),
        any::<bool>(),
    )
        .prop_map(|(recipes, goals, initial, merge)| {
            let stock = Resource::ALL
                .iter()
                .zip(initial)
                .fold(Stock::default(), |stock, (&resource, amount)| {
                    stock.with(resource, amount)
                });
            let goals = goals
                .into_iter()
                .map(|(resource, amount)| AtLeast::new(resource, amount))
                .collect();
            let agent = Stockpile::new(stock, goals, recipes);
            if merge {
                agent.merging()
            } else {
                agent
            }
        })
}

/// Records every polled cost; cancels past the ceiling or the poll budget.
fn bounded(polled: &mut Vec<f64>) -> impl Watchdog + '_ {
    let budget = poll_fn(move |cost| {
        polled.push(cost);
        if polled.len() > POLL_BUDGET {
            Verdict::Cancel
        } else {
            Verdict::Continue
        }
    });
    budget.or(CostCeiling::new(COST_CEILING))
}

fn replay_satisfies(agent: &Ledgered<Stockpile>, actions: &[&Recipe], goal: &AtLeast) -> bool {
    let Some(initial) = agent.world() else {
        return false;
    };
    let mut world = *initial;
    for action in actions {
        action.apply_effect(&mut world);
    }
    goal.check_and_try_satisfy(initial, &mut world) == Satisfaction::Satisfied
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn polled_costs_never_decrease(stockpile in arb_stockpile()) {
        let agent = Ledgered::new(stockpile);
        let mut polled = Vec::new();
        let plan = Planner::new(&agent)
            .cheapest_of_goals()
            .watchdog(bounded(&mut polled))
            .run()
            .unwrap();
        drop(plan);
        prop_assert!(polled.windows(2).all(|w| w[0] <= w[1]), "{:?}", polled);
    }

    #[test]
    fn found_plans_are_consistent(stockpile in arb_stockpile()) {
        let agent = Ledgered::new(stockpile);
        let mut polled = Vec::new();
        let plan = Planner::new(&agent)
            .cheapest_of_goals()
            .watchdog(bounded(&mut polled))
            .run()
            .unwrap();
        if plan.is_usable() {
            let summed: f64 = plan.actions().iter().map(|action| action.cost()).sum();
            prop_assert!((summed - plan.cost()).abs() < 1e-9);
            let goal = plan.goal().unwrap();
            prop_assert!(replay_satisfies(&agent, plan.actions(), goal));
        } else {
            prop_assert!(plan.is_empty());
            prop_assert!(plan.goal().is_none());
        }
        if plan.status() == PlanStatus::FoundPlan {
            prop_assert!(plan.cost() < COST_CEILING);
        }
    }

    #[test]
    fn no_world_clone_outlives_the_call(stockpile in arb_stockpile()) {
        let agent = Ledgered::new(stockpile);
        let mut polled = Vec::new();
        let plan = Planner::new(&agent)
            .cheapest_of_goals()
            .watchdog(bounded(&mut polled))
            .run()
            .unwrap();
        let stats = *plan.stats();
        drop(plan);
        let ledger = agent.snapshot();
        prop_assert_eq!(ledger.outstanding_worlds(), 0);
        prop_assert_eq!(ledger.world_returns, stats.worlds_released);
        prop_assert_eq!(ledger.goal_returns, stats.goal_nodes_created + ledger.merges);
    }

    #[test]
    fn independent_runs_agree(stockpile in arb_stockpile()) {
        let agent = Ledgered::new(stockpile);
        let mut first_polls = Vec::new();
        let first = Planner::new(&agent)
            .cheapest_of_goals()
            .watchdog(bounded(&mut first_polls))
            .run()
            .unwrap();
        let mut second_polls = Vec::new();
        let second = Planner::new(&agent)
            .cheapest_of_goals()
            .watchdog(bounded(&mut second_polls))
            .run()
            .unwrap();
        prop_assert_eq!(first.status(), second.status());
        prop_assert_eq!(first.action_indices(), second.action_indices());
        prop_assert_eq!(first.cost().to_bits(), second.cost().to_bits());
        prop_assert_eq!(first.goal_index(), second.goal_index());
    }
}
