//! Instrumented agent wrapper that counts world and goal hand-offs.
//!
//! [`Ledgered`] forwards every [`Agent`] method to the wrapped agent and
//! records each clone and return. After a planning call (found, not found,
//! cancelled, failed or dropped) every world clone must have come back:
//! [`LedgerSnapshot::outstanding_worlds`] is zero.
//!
//! Goal hand-offs are counted but not balanced here: the engine also
//! returns goals it obtained from `Action::required_goal` and from merges,
//! which never pass through `clone_goal`.

use std::cell::Cell;

use quarry_kernel::contract::{Agent, Capabilities};

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub world_clones: u64,
    pub world_returns: u64,
    pub goal_clones: u64,
    pub goal_returns: u64,
    pub merges: u64,
}

impl LedgerSnapshot {
    /// World clones handed out and not yet returned.
    #[must_use]
    pub fn outstanding_worlds(&self) -> i128 {
        i128::from(self.world_clones) - i128::from(self.world_returns)
    }
}

/// Wraps an agent and counts its hand-offs.
#[derive(Debug, Default)]
pub struct Ledgered<A> {
    inner: A,
    world_clones: Cell<u64>,
    world_returns: Cell<u64>,
    goal_clones: Cell<u64>,
    goal_returns: Cell<u64>,
    merges: Cell<u64>,
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

impl<A: Agent> Ledgered<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            world_clones: Cell::new(0),
            world_returns: Cell::new(0),
            goal_clones: Cell::new(0),
            goal_returns: Cell::new(0),
            merges: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            world_clones: self.world_clones.get(),
            world_returns: self.world_returns.get(),
            goal_clones: self.goal_clones.get(),
            goal_returns: self.goal_returns.get(),
            merges: self.merges.get(),
        }
    }

}

impl<A: Agent> Agent for Ledgered<A> {
    type World = A::World;
    type Goal = A::Goal;
    type Action = A::Action;

    fn world(&self) -> Option<&Self::World> {
        self.inner.world()
    }

    fn goals(&self) -> &[Self::Goal] {
        self.inner.goals()
    }

    fn actions(&self) -> &[Self::Action] {
        self.inner.actions()
    }

    fn clone_world(&self, world: &Self::World) -> Self::World {
        bump(&self.world_clones);
        self.inner.clone_world(world)
    }

    fn return_world(&self, world: Self::World) {
        bump(&self.world_returns);
        self.inner.return_world(world);
    }

    fn clone_goal(&self, goal: &Self::Goal) -> Self::Goal {
        bump(&self.goal_clones);
        self.inner.clone_goal(goal)
    }

    fn return_goal(&self, goal: Self::Goal) {
        bump(&self.goal_returns);
        self.inner.return_goal(goal);
    }

    fn try_merge(&self, top: &Self::Goal, required: &Self::Goal) -> Option<Self::Goal> {
        let merged = self.inner.try_merge(top, required);
        if merged.is_some() {
            bump(&self.merges);
        }
        merged
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }
}
