//! Search nodes and the frontier ordering key.

use crate::goal_stack::GoalIndex;

/// Handle to a node in the engine's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

/// Role of a node in the search forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Root seeded for the candidate goal at index `candidate`.
    Start { candidate: usize },
    /// Interior node with outstanding goals.
    Normal,
    /// Accepting node: every goal on the branch was discharged.
    End,
}

/// One entry of the node table.
///
/// Invariants:
/// - `Start` has no parent and no action; its `goal_head` holds the
///   candidate goal.
/// - `Normal` has a parent, an action, a goal head and a world clone until
///   it is expanded.
/// - `End` has a parent and an action but no goal head and no world.
/// - `parent` always has a strictly smaller index.
#[derive(Debug, Clone)]
pub struct PathNode<W> {
    pub parent: Option<NodeIndex>,
    /// Index into the agent's action list.
    pub action: Option<usize>,
    pub goal_head: Option<GoalIndex>,
    /// Owned world clone; taken when the node is expanded or swept.
    pub world: Option<W>,
    pub kind: NodeKind,
    /// Accumulated cost from the `Start` node.
    pub cost: f64,
    pub was_dequeued: bool,
}

impl<W> PathNode<W> {
    #[must_use]
    pub fn start(candidate: usize, goal_head: GoalIndex, world: W) -> Self {
        Self {
            parent: None,
            action: None,
            goal_head: Some(goal_head),
            world: Some(world),
            kind: NodeKind::Start { candidate },
            cost: 0.0,
            was_dequeued: false,
        }
    }

    #[must_use]
    pub fn normal(
        parent: NodeIndex,
        action: usize,
        goal_head: GoalIndex,
        world: W,
        cost: f64,
    ) -> Self {
        Self {
            parent: Some(parent),
            action: Some(action),
            goal_head: Some(goal_head),
            world: Some(world),
            kind: NodeKind::Normal,
            cost,
            was_dequeued: false,
        }
    }

    #[must_use]
    pub fn end(parent: NodeIndex, action: usize, cost: f64) -> Self {
        Self {
            parent: Some(parent),
            action: Some(action),
            goal_head: None,
            world: None,
            kind: NodeKind::End,
            cost,
            was_dequeued: false,
        }
    }

    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.kind == NodeKind::End
    }
}

/// The frontier ordering key: `(cost, creation_order)`.
///
/// Lower cost first; ties go to the older node, which keeps runs
/// deterministic. Costs compare with `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct FrontierKey {
    pub cost: f64,
    pub creation_order: u64,
}

impl PartialEq for FrontierKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for FrontierKey {}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.creation_order.cmp(&other.creation_order))
    }
}
