//! In-crate test agent: numbered bins filled by actions.

use std::cell::Cell;

use quarry_kernel::contract::{Action, Agent, Capabilities, Goal, Satisfaction};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bins(pub [u32; 4]);

/// At least `amount` in `bin`; consumed when satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct Need {
    pub bin: usize,
    pub amount: u32,
}

impl Goal<Bins> for Need {
    fn check_and_try_satisfy(&self, before: &Bins, now: &mut Bins) -> Satisfaction {
        if now.0[self.bin] >= self.amount {
            now.0[self.bin] -= self.amount;
            Satisfaction::Satisfied
        } else if now.0[self.bin] > before.0[self.bin] {
            Satisfaction::Progressed
        } else {
            Satisfaction::NotProgressed
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fill {
    pub bin: usize,
    pub amount: u32,
    pub cost: f64,
    pub requires: Option<Need>,
    pub panics: bool,
}

impl Fill {
    pub fn new(bin: usize, amount: u32, cost: f64) -> Self {
        Self {
            bin,
            amount,
            cost,
            requires: None,
            panics: false,
        }
    }

    pub fn requiring(mut self, bin: usize, amount: u32) -> Self {
        self.requires = Some(Need { bin, amount });
        self
    }
}

impl Action<Bins, Need> for Fill {
    fn required_goal(&self) -> Option<Need> {
        self.requires.clone()
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn apply_effect(&self, world: &mut Bins) {
        assert!(!self.panics, "fill effect exploded");
        world.0[self.bin] += self.amount;
    }
}

#[derive(Default)]
pub struct BinAgent {
    pub world: Option<Bins>,
    pub goals: Vec<Need>,
    pub actions: Vec<Fill>,
    pub merge: bool,
    pub world_clones: Cell<u64>,
    pub world_returns: Cell<u64>,
    pub goal_clones: Cell<u64>,
    pub goal_returns: Cell<u64>,
    pub merges: Cell<u64>,
}

impl BinAgent {
    pub fn new(goals: Vec<Need>, actions: Vec<Fill>) -> Self {
        Self {
            world: Some(Bins::default()),
            goals,
            actions,
            ..Self::default()
        }
    }

    pub fn outstanding_worlds(&self) -> u64 {
        self.world_clones.get() - self.world_returns.get()
    }
}

impl Agent for BinAgent {
    type World = Bins;
    type Goal = Need;
    type Action = Fill;

    fn world(&self) -> Option<&Bins> {
        self.world.as_ref()
    }

    fn goals(&self) -> &[Need] {
        &self.goals
    }

    fn actions(&self) -> &[Fill] {
        &self.actions
    }

    fn clone_world(&self, world: &Bins) -> Bins {
        self.world_clones.set(self.world_clones.get() + 1);
        world.clone()
    }

    fn return_world(&self, _world: Bins) {
        self.world_returns.set(self.world_returns.get() + 1);
    }

    fn clone_goal(&self, goal: &Need) -> Need {
        self.goal_clones.set(self.goal_clones.get() + 1);
        goal.clone()
    }

    fn return_goal(&self, _goal: Need) {
        self.goal_returns.set(self.goal_returns.get() + 1);
    }

    fn try_merge(&self, top: &Need, required: &Need) -> Option<Need> {
        if self.merge && top.bin == required.bin {
            self.merges.set(self.merges.get() + 1);
            Some(Need {
                bin: top.bin,
                amount: top.amount + required.amount,
            })
        } else {
            None
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            pools_worlds: true,
            pools_goals: true,
            merges_goals: self.merge,
        }
    }
}
