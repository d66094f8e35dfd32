//! Stockpile: a numeric world exercising the optional agent capabilities.
//!
//! The world is a count per [`Resource`]. An [`AtLeast`] goal progresses
//! while its resource grows and, once met, consumes the amount it asked
//! for, so later preconditions have to be produced again. The agent
//! recycles world clones through a free list and merges goals on the same
//! resource by adding their amounts.

use std::cell::{Cell, RefCell};
use std::fmt;

use quarry_kernel::contract::{Action, Agent, Capabilities, Goal, Satisfaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Ore,
    Coal,
    Ingot,
    Tool,
}

impl Resource {
    pub const ALL: [Self; 4] = [Self::Ore, Self::Coal, Self::Ingot, Self::Tool];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ore => "ore",
            Self::Coal => "coal",
            Self::Ingot => "ingot",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stock([u32; 4]);

impl Stock {
    #[must_use]
    pub fn get(&self, resource: Resource) -> u32 {
        self.0[resource as usize]
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        let slot = &mut self.0[resource as usize];
        *slot = slot.saturating_add(amount);
    }

    pub fn take(&mut self, resource: Resource, amount: u32) {
        let slot = &mut self.0[resource as usize];
        *slot = slot.saturating_sub(amount);
    }

    #[must_use]
    pub fn with(mut self, resource: Resource, amount: u32) -> Self {
        self.add(resource, amount);
        self
    }
}

/// At least `amount` of `resource`, consumed once met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtLeast {
    pub resource: Resource,
    pub amount: u32,
}

impl AtLeast {
    #[must_use]
    pub fn new(resource: Resource, amount: u32) -> Self {
        Self { resource, amount }
    }
}

impl Goal<Stock> for AtLeast {
    fn check_and_try_satisfy(&self, before: &Stock, now: &mut Stock) -> Satisfaction {
        let have = now.get(self.resource);
        if have >= self.amount {
            now.take(self.resource, self.amount);
            Satisfaction::Satisfied
        } else if have > before.get(self.resource) {
            Satisfaction::Progressed
        } else {
            Satisfaction::NotProgressed
        }
    }
}

impl fmt::Display for AtLeast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>={}", self.resource, self.amount)
    }
}

/// Produces `yields` units of `output`, optionally needing an input first.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub name: &'static str,
    pub cost: f64,
    pub output: Resource,
    pub yields: u32,
    pub needs: Option<AtLeast>,
}

impl Recipe {
    #[must_use]
    pub fn new(name: &'static str, cost: f64, output: Resource, yields: u32) -> Self {
        Self {
            name,
            cost,
            output,
            yields,
            needs: None,
        }
    }

    #[must_use]
    pub fn needs(mut self, resource: Resource, amount: u32) -> Self {
        self.needs = Some(AtLeast::new(resource, amount));
        self
    }
}

impl Action<Stock, AtLeast> for Recipe {
    fn required_goal(&self) -> Option<AtLeast> {
        self.needs
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn apply_effect(&self, world: &mut Stock) {
        world.add(self.output, self.yields);
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Stockpile agent with a world free list and optional goal merging.
#[derive(Debug, Default)]
pub struct Stockpile {
    pub world: Option<Stock>,
    pub goals: Vec<AtLeast>,
    pub recipes: Vec<Recipe>,
    pub merge_goals: bool,
    free: RefCell<Vec<Stock>>,
    recycled: Cell<u64>,
    merged: Cell<u64>,
}

impl Stockpile {
    #[must_use]
    pub fn new(world: Stock, goals: Vec<AtLeast>, recipes: Vec<Recipe>) -> Self {
        Self {
            world: Some(world),
            goals,
            recipes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn merging(mut self) -> Self {
        self.merge_goals = true;
        self
    }

    /// World clones served from the free list.
    #[must_use]
    pub fn recycled(&self) -> u64 {
        self.recycled.get()
    }

    /// Successful goal merges.
    #[must_use]
    pub fn merged(&self) -> u64 {
        self.merged.get()
    }

    /// Worlds currently parked in the free list.
    #[must_use]
    pub fn idle_worlds(&self) -> usize {
        self.free.borrow().len()
    }
}

impl Agent for Stockpile {
    type World = Stock;
    type Goal = AtLeast;
    type Action = Recipe;

    fn world(&self) -> Option<&Stock> {
        self.world.as_ref()
    }

    fn goals(&self) -> &[AtLeast] {
        &self.goals
    }

    fn actions(&self) -> &[Recipe] {
        &self.recipes
    }

    fn clone_world(&self, world: &Stock) -> Stock {
        match self.free.borrow_mut().pop() {
            Some(mut recycled) => {
                self.recycled.set(self.recycled.get() + 1);
                recycled.clone_from(world);
                recycled
            }
            None => *world,
        }
    }

    fn return_world(&self, world: Stock) {
        self.free.borrow_mut().push(world);
    }

    fn try_merge(&self, top: &AtLeast, required: &AtLeast) -> Option<AtLeast> {
        if !self.merge_goals || top.resource != required.resource {
            return None;
        }
        let amount = top.amount.checked_add(required.amount)?;
        self.merged.set(self.merged.get() + 1);
        Some(AtLeast::new(top.resource, amount))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            pools_worlds: true,
            pools_goals: false,
            merges_goals: self.merge_goals,
        }
    }
}

/// Mining, charcoal burning, smelting and forging.
#[must_use]
pub fn foundry_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("mine", 1.0, Resource::Ore, 1),
        Recipe::new("burn", 0.5, Resource::Coal, 1),
        Recipe::new("smelt", 2.0, Resource::Ingot, 1).needs(Resource::Ore, 2),
        Recipe::new("forge", 3.0, Resource::Tool, 1).needs(Resource::Ingot, 2),
    ]
}

/// One tool from an empty stockpile.
#[must_use]
pub fn forge_one_tool() -> Stockpile {
    Stockpile::new(
        Stock::default(),
        vec![AtLeast::new(Resource::Tool, 1)],
        foundry_recipes(),
    )
}

/// Five ore, with a bulk drill whose precondition is more ore. When the
/// drill only progresses the goal, merging folds its requirement into the
/// ore goal beneath it.
#[must_use]
pub fn ore_with_drill() -> Stockpile {
    Stockpile::new(
        Stock::default(),
        vec![AtLeast::new(Resource::Ore, 5)],
        vec![
            Recipe::new("mine", 1.0, Resource::Ore, 1),
            Recipe::new("drill", 1.5, Resource::Ore, 3).needs(Resource::Ore, 1),
        ],
    )
}
