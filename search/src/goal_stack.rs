//! Persistent goal stacks stored in an index-linked table.
//!
//! Each search branch owns a *head* index into a [`GoalTable`]. A goal node
//! is immutable once created: pushing appends a new node pointing at the
//! old head, popping just follows `previous`. Sibling branches therefore
//! share common tails without copying.
//!
//! Goal values are reclaimed in bulk by [`GoalTable::drain`] during the
//! engine's pooling sweep, never per-branch.

/// Handle to a goal node in a [`GoalTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalIndex(usize);

impl GoalIndex {
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

/// One entry of a persistent goal stack.
#[derive(Debug, Clone)]
pub struct GoalNode<G> {
    pub goal: G,
    /// The rest of the stack, or `None` at the bottom.
    pub previous: Option<GoalIndex>,
}

/// Result of [`GoalTable::push_merged`].
#[derive(Debug)]
pub struct Pushed<G> {
    /// The new stack head.
    pub head: GoalIndex,
    /// The pushed goal, handed back when it was folded into the top goal.
    pub merged_away: Option<G>,
}

/// Growable arena of goal nodes.
#[derive(Debug, Clone)]
pub struct GoalTable<G> {
    nodes: Vec<GoalNode<G>>,
}

impl<G> Default for GoalTable<G> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<G> GoalTable<G> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `goal` on top of the stack headed by `previous`.
    pub fn push(&mut self, previous: Option<GoalIndex>, goal: G) -> GoalIndex {
        let index = GoalIndex(self.nodes.len());
        self.nodes.push(GoalNode { goal, previous });
        index
    }

    /// Push `goal`, first offering `merge` the chance to fold it into the
    /// current top goal.
    ///
    /// When `merge(top, goal)` returns a combined goal, the new head replaces
    /// the old top (the stack does not grow) and `goal` is handed back in
    /// [`Pushed::merged_away`] so the caller can recycle it.
    pub fn push_merged<F>(&mut self, head: Option<GoalIndex>, goal: G, merge: F) -> Pushed<G>
    where
        F: FnOnce(&G, &G) -> Option<G>,
    {
        if let Some(top) = head {
            let combined = merge(&self.nodes[top.0].goal, &goal);
            if let Some(combined) = combined {
                let rest = self.nodes[top.0].previous;
                return Pushed {
                    head: self.push(rest, combined),
                    merged_away: Some(goal),
                };
            }
        }
        Pushed {
            head: self.push(head, goal),
            merged_away: None,
        }
    }

    /// The goal at `head`.
    #[must_use]
    pub fn goal(&self, head: GoalIndex) -> &G {
        &self.nodes[head.0].goal
    }

    /// The stack below `head` (a "pop" that never mutates).
    #[must_use]
    pub fn previous(&self, head: GoalIndex) -> Option<GoalIndex> {
        self.nodes[head.0].previous
    }

    /// Number of goals on the stack headed by `head`.
    #[must_use]
    pub fn depth(&self, head: Option<GoalIndex>) -> usize {
        self.stack(head).count()
    }

    /// Iterate a stack from top to bottom.
    #[must_use]
    pub fn stack(&self, head: Option<GoalIndex>) -> Stack<'_, G> {
        Stack { table: self, next: head }
    }

    /// Number of goal nodes ever created (since the last drain).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every goal value, keeping the allocation for reuse.
    pub fn drain(&mut self) -> impl Iterator<Item = G> + '_ {
        self.nodes.drain(..).map(|node| node.goal)
    }
}

/// Top-to-bottom iterator over one goal stack.
pub struct Stack<'t, G> {
    table: &'t GoalTable<G>,
    next: Option<GoalIndex>,
}

impl<'t, G> Iterator for Stack<'t, G> {
    type Item = &'t G;

    fn next(&mut self) -> Option<&'t G> {
        let index = self.next?;
        let node = &self.table.nodes[index.0];
        self.next = node.previous;
        Some(&node.goal)
    }
}
