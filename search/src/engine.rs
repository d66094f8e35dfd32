//! The search engine: node table, goal table, frontier, expansion step,
//! path reconstruction and the pooling sweep.
//!
//! One [`SearchEngine`] serves one planning call at a time. Instances are
//! recycled through a [`quarry_kernel::pool::Pool`]; [`SearchEngine::sweep`]
//! hands every outstanding world clone and goal value back to the agent and
//! clears (without deallocating) the buffers, so a recycled engine starts
//! empty with warm capacity.
//!
//! # Lifecycle
//!
//! ```text
//! initialize → expand* → finalize → sweep
//!            ↘ (error / cancel / drop) → sweep
//! ```
//!
//! Ownership: every world clone is owned by exactly one node until it is
//! expanded (then handed back), forwarded into a child, or swept.

use std::panic::{catch_unwind, AssertUnwindSafe};

use quarry_kernel::contract::{Action, Agent, Goal, Satisfaction};

use crate::error::{panic_detail, PlanError};
use crate::frontier::CostFrontier;
use crate::goal_stack::{GoalIndex, GoalTable};
use crate::node::{NodeIndex, NodeKind, PathNode};
use crate::plan::{Plan, PlanStatus, SearchStats};
use crate::policy::GoalMode;
use crate::trace::Tracer;
use crate::watchdog::{Verdict, Watchdog};

/// Result of one [`SearchEngine::expand`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// A node was expanded; more work may remain.
    Continue,
    /// The watchdog asked for a suspension; nothing was popped.
    Suspended,
    /// The watchdog cancelled the search.
    Cancelled,
    /// An accepting node was popped, or the frontier is exhausted.
    Complete,
}

/// Per-call search state. Recycled through the engine pool.
pub struct SearchEngine<W, G> {
    nodes: Vec<PathNode<W>>,
    goals: GoalTable<G>,
    frontier: CostFrontier,
    /// The accepting node popped from the frontier.
    accepting: Option<NodeIndex>,
    /// Cheapest accepting node queued so far.
    best_queued: Option<(NodeIndex, f64)>,
    cancelled: bool,
    last_popped: Option<f64>,
    expansions: u64,
    suspensions: u64,
    worlds_released: u64,
}

impl<W, G> Default for SearchEngine<W, G> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            goals: GoalTable::new(),
            frontier: CostFrontier::new(),
            accepting: None,
            best_queued: None,
            cancelled: false,
            last_popped: None,
            expansions: 0,
            suspensions: 0,
            worlds_released: 0,
        }
    }
}

impl<W, G> SearchEngine<W, G> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the engine holds no nodes, goals or frontier entries.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.nodes.is_empty() && self.goals.is_empty() && self.frontier.is_empty()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Entries still queued.
    #[must_use]
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Counters for the current call.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            expansions: self.expansions,
            nodes_created: self.nodes.len() as u64,
            goal_nodes_created: self.goals.len() as u64,
            frontier_high_water: self.frontier.high_water() as u64,
            suspensions: self.suspensions,
            worlds_released: self.worlds_released,
        }
    }

    /// World clones still owned by queued nodes.
    fn queued_worlds(&self) -> u64 {
        self.nodes.iter().filter(|node| node.world.is_some()).count() as u64
    }

    fn enqueue(&mut self, node: PathNode<W>) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        let cost = node.cost;
        if node.is_accepting() && self.best_queued.is_none_or(|(_, best)| cost < best) {
            self.best_queued = Some((index, cost));
        }
        self.nodes.push(node);
        self.frontier.push(index, cost);
        index
    }

    /// Seed the frontier with one `Start` node per selected candidate goal.
    ///
    /// # Errors
    ///
    /// Contract violations, checked before any clone is made:
    /// [`PlanError::NullWorldState`], [`PlanError::EmptyGoalSet`],
    /// [`PlanError::EmptyActionSet`], [`PlanError::GoalIndexOutOfRange`].
    pub(crate) fn initialize<A>(
        &mut self,
        agent: &A,
        mode: GoalMode,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), PlanError>
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        debug_assert!(self.is_clear(), "engine leased without being swept");
        let world = agent.world().ok_or(PlanError::NullWorldState)?;
        let goals = agent.goals();
        let candidates = mode.candidates(goals.len())?;
        let actions = agent.actions();
        if actions.is_empty() {
            return Err(PlanError::EmptyActionSet);
        }

        if tracer.enabled() {
            let caps = agent.capabilities();
            tracer.emit(|| format!("plan {mode:?} capabilities {caps:?}"));
            for (i, goal) in goals.iter().enumerate() {
                tracer.emit(|| format!("goal[{i}] {goal:?}"));
            }
            for (i, action) in actions.iter().enumerate() {
                tracer.emit(|| format!("action[{i}] {action:?} cost {}", action.cost()));
            }
        }

        for candidate in candidates {
            let head = self.goals.push(None, agent.clone_goal(&goals[candidate]));
            let start = PathNode::start(candidate, head, agent.clone_world(world));
            self.enqueue(start);
        }
        tracing::debug!(
            seeded = self.frontier.len(),
            actions = actions.len(),
            "planner initialized"
        );
        Ok(())
    }

    /// Poll the watchdog, then pop and expand the cheapest frontier entry.
    ///
    /// # Errors
    ///
    /// Fatal collaborator failures: [`PlanError::InvalidWatchdogResult`],
    /// [`PlanError::InvalidActionCost`], [`PlanError::ActionEffectFailed`],
    /// [`PlanError::InvalidSatisfactionResult`]; and
    /// [`PlanError::FrontierInvariant`] for a corrupt node table.
    pub(crate) fn expand<A, D>(
        &mut self,
        agent: &A,
        watchdog: &mut D,
        tracer: &mut Tracer<'_>,
    ) -> Result<Expansion, PlanError>
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
        D: Watchdog + ?Sized,
    {
        if self.cancelled {
            return Ok(Expansion::Cancelled);
        }
        if self.accepting.is_some() {
            return Ok(Expansion::Complete);
        }
        let Some(next_cost) = self.frontier.peek_cost() else {
            return Ok(Expansion::Complete);
        };

        let verdict = catch_unwind(AssertUnwindSafe(|| watchdog.poll(next_cost))).map_err(
            |payload| PlanError::InvalidWatchdogResult {
                detail: panic_detail(payload.as_ref()),
            },
        )?;
        match verdict {
            Verdict::Continue => {}
            Verdict::Suspend => {
                self.suspensions += 1;
                return Ok(Expansion::Suspended);
            }
            Verdict::Cancel => {
                self.cancelled = true;
                tracing::debug!(cost = next_cost, "planner cancelled by watchdog");
                tracer.emit(|| format!("cancelled at cost {next_cost}"));
                return Ok(Expansion::Cancelled);
            }
        }

        let Some((index, cost)) = self.frontier.pop() else {
            return Err(PlanError::FrontierInvariant {
                detail: "pop from non-empty frontier returned nothing".into(),
            });
        };
        debug_assert!(
            self.last_popped.is_none_or(|last| last <= cost),
            "frontier pops must be non-decreasing"
        );
        self.last_popped = Some(cost);
        self.expansions += 1;

        let node = &mut self.nodes[index.0];
        node.was_dequeued = true;
        if node.is_accepting() {
            self.accepting = Some(index);
            tracing::debug!(node = index.0, cost, "accepting node popped");
            tracer.emit(|| format!("accept node {} cost {cost}", index.0));
            return Ok(Expansion::Complete);
        }
        let Some(head) = node.goal_head else {
            return Err(PlanError::FrontierInvariant {
                detail: format!("node {} queued without a goal stack", index.0),
            });
        };
        let Some(world) = node.world.take() else {
            return Err(PlanError::FrontierInvariant {
                detail: format!("node {} queued without a world state", index.0),
            });
        };

        tracing::trace!(node = index.0, cost, "expanding");
        if tracer.enabled() {
            let depth = self.goals.depth(Some(head));
            let goal = self.goals.goal(head);
            tracer.emit(|| format!("expand node {} cost {cost} depth {depth} head {goal:?}", index.0));
        }

        let result = self.expand_actions(agent, index, cost, head, &world);
        self.release_world(agent, world);
        result.map(|()| Expansion::Continue)
    }

    fn expand_actions<A>(
        &mut self,
        agent: &A,
        parent: NodeIndex,
        base_cost: f64,
        head: GoalIndex,
        world: &W,
    ) -> Result<(), PlanError>
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        for (action_index, action) in agent.actions().iter().enumerate() {
            let action_cost = action.cost();
            if !action_cost.is_finite() || action_cost < 0.0 {
                return Err(PlanError::InvalidActionCost {
                    action: action_index,
                    cost: action_cost,
                });
            }

            let mut child = agent.clone_world(world);
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| action.apply_effect(&mut child)))
            {
                self.release_world(agent, child);
                return Err(PlanError::ActionEffectFailed {
                    action: action_index,
                    detail: panic_detail(payload.as_ref()),
                });
            }

            let goal = self.goals.goal(head);
            let satisfaction = match catch_unwind(AssertUnwindSafe(|| {
                goal.check_and_try_satisfy(world, &mut child)
            })) {
                Ok(satisfaction) => satisfaction,
                Err(payload) => {
                    self.release_world(agent, child);
                    return Err(PlanError::InvalidSatisfactionResult {
                        action: action_index,
                        detail: panic_detail(payload.as_ref()),
                    });
                }
            };

            let cost = base_cost + action_cost;
            match satisfaction {
                Satisfaction::NotProgressed => self.release_world(agent, child),
                Satisfaction::Satisfied => {
                    let remaining = self.goals.previous(head);
                    let stack = match action.required_goal() {
                        Some(required) => Some(self.push_goal(agent, remaining, required)),
                        None => remaining,
                    };
                    match stack {
                        Some(stack) => {
                            self.enqueue(PathNode::normal(parent, action_index, stack, child, cost));
                        }
                        None => {
                            self.release_world(agent, child);
                            self.enqueue(PathNode::end(parent, action_index, cost));
                        }
                    }
                }
                Satisfaction::Progressed => {
                    let stack = match action.required_goal() {
                        Some(required) => self.push_goal(agent, Some(head), required),
                        None => head,
                    };
                    self.enqueue(PathNode::normal(parent, action_index, stack, child, cost));
                }
            }
        }
        Ok(())
    }

    fn push_goal<A>(&mut self, agent: &A, head: Option<GoalIndex>, required: G) -> GoalIndex
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        let pushed = self
            .goals
            .push_merged(head, required, |top, required| agent.try_merge(top, required));
        if let Some(merged_away) = pushed.merged_away {
            agent.return_goal(merged_away);
        }
        pushed.head
    }

    fn release_world<A>(&mut self, agent: &A, world: W)
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        agent.return_world(world);
        self.worlds_released += 1;
    }

    /// Build the plan from the accepting node (or the cheapest queued one,
    /// if cancelled).
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::FrontierInvariant`] if the parent chain from the
    /// accepting node does not reach a `Start` node.
    pub(crate) fn finalize<'a, A>(
        &mut self,
        agent: &'a A,
        tracer: &mut Tracer<'_>,
    ) -> Result<Plan<'a, A>, PlanError>
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        // The sweep that follows hands back every world still queued.
        let mut stats = self.stats();
        stats.worlds_released += self.queued_worlds();
        let (end, status) = match (self.accepting, self.best_queued, self.cancelled) {
            (Some(end), _, _) => (end, PlanStatus::FoundPlan),
            (None, Some((end, _)), true) => (end, PlanStatus::CancelledButFound),
            (None, None, true) => {
                tracer.emit(|| "finalize: cancelled".to_string());
                return Ok(Plan::empty(PlanStatus::Cancelled, stats));
            }
            (None, _, false) => {
                tracer.emit(|| "finalize: no plan".to_string());
                return Ok(Plan::empty(PlanStatus::NotFound, stats));
            }
        };

        // Walking up from the accepting node yields actions in execution
        // order: the action that discharged the last outstanding goal runs
        // first.
        let mut actions = Vec::new();
        let mut cursor = end;
        let candidate = loop {
            let node = &self.nodes[cursor.0];
            match (node.kind, node.action, node.parent) {
                (NodeKind::Start { candidate }, _, _) => break candidate,
                (NodeKind::Normal | NodeKind::End, Some(action), Some(parent))
                    if parent < cursor =>
                {
                    actions.push(action);
                    cursor = parent;
                }
                _ => {
                    return Err(PlanError::FrontierInvariant {
                        detail: format!("broken parent chain at node {}", cursor.0),
                    });
                }
            }
        };

        let cost = self.nodes[end.0].cost;
        tracing::debug!(%status, cost, steps = actions.len(), "planner finalized");
        tracer.emit(|| format!("finalize: {status} cost {cost} actions {actions:?}"));
        Ok(Plan::found(agent, status, cost, candidate, actions, stats))
    }

    /// Hand every outstanding world clone and goal value back to the agent
    /// and clear all buffers for reuse. Returns the number of world clones
    /// handed back.
    pub(crate) fn sweep<A>(&mut self, agent: &A) -> usize
    where
        A: Agent<World = W, Goal = G>,
        G: Goal<W>,
    {
        let mut worlds = 0;
        for node in self.nodes.drain(..) {
            debug_assert!(
                !(node.was_dequeued && node.world.is_some()),
                "expanded node still owns its world"
            );
            if let Some(world) = node.world {
                agent.return_world(world);
                worlds += 1;
            }
        }
        let mut goals = 0usize;
        for goal in self.goals.drain() {
            agent.return_goal(goal);
            goals += 1;
        }
        self.frontier.clear();
        self.accepting = None;
        self.best_queued = None;
        self.cancelled = false;
        self.last_popped = None;
        self.expansions = 0;
        self.suspensions = 0;
        self.worlds_released = 0;
        tracing::debug!(worlds, goals, "engine swept");
        worlds
    }
}
