//! Woodcutter: a boolean-fact world with precondition chains.
//!
//! Facts are bits in [`Facts`]. A [`FactGoal`] is discharged by the action
//! that makes its fact true: it reports `Satisfied` when the fact was false
//! before the action and true after, and `NotProgressed` otherwise. Facts
//! never progress partially.
//!
//! Action costs along the full chain:
//!
//! ```text
//! chop (1) → saw (1) → split (1) → light (2)
//! logs       planks     kindling    fire
//! ```

use std::fmt;

use quarry_kernel::contract::{Action, Agent, Goal, Satisfaction};

/// A boolean world fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    HasAxe,
    HasLogs,
    HasPlanks,
    HasKindling,
    HasFire,
    HasGold,
}

impl Fact {
    fn bit(self) -> u32 {
        1 << self as u32
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HasAxe => "has_axe",
            Self::HasLogs => "has_logs",
            Self::HasPlanks => "has_planks",
            Self::HasKindling => "has_kindling",
            Self::HasFire => "has_fire",
            Self::HasGold => "has_gold",
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of facts that currently hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Facts(u32);

impl Facts {
    #[must_use]
    pub fn with(mut self, fact: Fact) -> Self {
        self.set(fact);
        self
    }

    pub fn set(&mut self, fact: Fact) {
        self.0 |= fact.bit();
    }

    pub fn clear(&mut self, fact: Fact) {
        self.0 &= !fact.bit();
    }

    #[must_use]
    pub fn holds(self, fact: Fact) -> bool {
        self.0 & fact.bit() != 0
    }
}

/// Make `fact` true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactGoal(pub Fact);

impl Goal<Facts> for FactGoal {
    fn check_and_try_satisfy(&self, before: &Facts, now: &mut Facts) -> Satisfaction {
        if !before.holds(self.0) && now.holds(self.0) {
            Satisfaction::Satisfied
        } else {
            Satisfaction::NotProgressed
        }
    }
}

impl fmt::Display for FactGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named action: requires one fact, sets one, optionally consumes one.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: &'static str,
    pub cost: f64,
    pub requires: Option<Fact>,
    pub sets: Fact,
    pub consumes: Option<Fact>,
}

impl Task {
    #[must_use]
    pub fn new(name: &'static str, cost: f64, sets: Fact) -> Self {
        Self {
            name,
            cost,
            requires: None,
            sets,
            consumes: None,
        }
    }

    #[must_use]
    pub fn requires(mut self, fact: Fact) -> Self {
        self.requires = Some(fact);
        self
    }

    #[must_use]
    pub fn consumes(mut self, fact: Fact) -> Self {
        self.consumes = Some(fact);
        self
    }
}

impl Action<Facts, FactGoal> for Task {
    fn required_goal(&self) -> Option<FactGoal> {
        self.requires.map(FactGoal)
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn apply_effect(&self, world: &mut Facts) {
        if let Some(fact) = self.consumes {
            world.clear(fact);
        }
        world.set(self.sets);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Woodcutter agent. Uses the default (non-pooling) clone and release.
#[derive(Debug, Clone, Default)]
pub struct Woodcutter {
    pub world: Option<Facts>,
    pub goals: Vec<FactGoal>,
    pub tasks: Vec<Task>,
}

impl Agent for Woodcutter {
    type World = Facts;
    type Goal = FactGoal;
    type Action = Task;

    fn world(&self) -> Option<&Facts> {
        self.world.as_ref()
    }

    fn goals(&self) -> &[FactGoal] {
        &self.goals
    }

    fn actions(&self) -> &[Task] {
        &self.tasks
    }
}

#[must_use]
pub fn chop() -> Task {
    Task::new("chop", 1.0, Fact::HasLogs).requires(Fact::HasAxe)
}

#[must_use]
pub fn chop_free() -> Task {
    Task::new("chop", 1.0, Fact::HasLogs)
}

#[must_use]
pub fn saw() -> Task {
    Task::new("saw", 1.0, Fact::HasPlanks)
        .requires(Fact::HasLogs)
        .consumes(Fact::HasLogs)
}

#[must_use]
pub fn split() -> Task {
    Task::new("split", 1.0, Fact::HasKindling)
        .requires(Fact::HasPlanks)
        .consumes(Fact::HasPlanks)
}

#[must_use]
pub fn light() -> Task {
    Task::new("light", 2.0, Fact::HasFire)
        .requires(Fact::HasKindling)
        .consumes(Fact::HasKindling)
}

#[must_use]
pub fn buy_axe() -> Task {
    Task::new("buy_axe", 3.0, Fact::HasAxe).requires(Fact::HasGold)
}

fn holding_axe() -> Option<Facts> {
    Some(Facts::default().with(Fact::HasAxe))
}

/// `{has_logs: false, has_axe: true}`, goal `has_logs`, one unconditional
/// `chop`. Plan: `[chop]`, cost 1.
#[must_use]
pub fn single_chop() -> Woodcutter {
    Woodcutter {
        world: holding_axe(),
        goals: vec![FactGoal(Fact::HasLogs)],
        tasks: vec![chop_free()],
    }
}

/// Goal `has_planks`; `saw` requires logs. Plan: `[chop, saw]`, cost 2.
#[must_use]
pub fn plank_chain() -> Woodcutter {
    Woodcutter {
        world: holding_axe(),
        goals: vec![FactGoal(Fact::HasPlanks)],
        tasks: vec![saw(), chop_free()],
    }
}

/// Goals `has_fire` (cost 5) and `has_planks` (cost 2).
#[must_use]
pub fn fire_or_planks() -> Woodcutter {
    Woodcutter {
        world: holding_axe(),
        goals: vec![FactGoal(Fact::HasFire), FactGoal(Fact::HasPlanks)],
        tasks: vec![light(), split(), saw(), chop_free()],
    }
}

/// Goal `has_fire` with a single unit-cost action per link. Only plan costs 4.
#[must_use]
pub fn unit_fire_chain() -> Woodcutter {
    let mut quick_light = light();
    quick_light.cost = 1.0;
    Woodcutter {
        world: holding_axe(),
        goals: vec![FactGoal(Fact::HasFire)],
        tasks: vec![quick_light, split(), saw(), chop_free()],
    }
}

/// Goal `has_fire` with no way to light it.
#[must_use]
pub fn no_fire() -> Woodcutter {
    Woodcutter {
        world: holding_axe(),
        goals: vec![FactGoal(Fact::HasFire)],
        tasks: vec![saw(), chop_free()],
    }
}

/// Goal `has_planks` without an axe: chopping needs one, buying one needs
/// gold nobody can produce.
#[must_use]
pub fn broke_without_axe() -> Woodcutter {
    Woodcutter {
        world: Some(Facts::default()),
        goals: vec![FactGoal(Fact::HasPlanks)],
        tasks: vec![saw(), chop(), buy_axe()],
    }
}
