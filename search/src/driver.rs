//! Execution drivers.
//!
//! [`Planner`] configures a call; its terminal operations pick a scheduling
//! discipline:
//!
//! - [`Planner::run`]: blocking loop, `Suspended` yields the OS thread.
//! - [`Planner::run_async`]: yielding loop, `Suspended` yields to the async
//!   scheduler.
//! - [`Planner::stepper`]: external stepping, one expansion per call.
//!
//! All three hold the pooled engine in an [`ActiveSearch`] guard, whose
//! `Drop` sweeps the engine if finalization did not. The sweep therefore
//! runs exactly once on every exit path, including errors, early drops and
//! unwinding.

use std::future::Future;
use std::mem;

use quarry_kernel::contract::Agent;
use quarry_kernel::pool::{Lease, Pool};

use crate::engine::{Expansion, SearchEngine};
use crate::error::PlanError;
use crate::plan::{Plan, PlanStatus};
use crate::policy::GoalMode;
use crate::trace::{TraceSink, Tracer};
use crate::watchdog::{AlwaysContinue, Watchdog};

/// Engine pool for an agent type.
pub type EnginePool<A> = Pool<SearchEngine<<A as Agent>::World, <A as Agent>::Goal>>;

/// Configuration for one planning call.
pub struct Planner<'a, A: Agent, D = AlwaysContinue> {
    agent: &'a A,
    mode: GoalMode,
    watchdog: D,
    sink: Option<&'a mut dyn TraceSink>,
    pool: &'a EnginePool<A>,
}

impl<'a, A: Agent> Planner<'a, A> {
    /// Plan for the agent's first candidate goal, never cancelling, using
    /// the process-wide engine pool.
    pub fn new(agent: &'a A) -> Self {
        Self {
            agent,
            mode: GoalMode::default(),
            watchdog: AlwaysContinue,
            sink: None,
            pool: Pool::shared(),
        }
    }
}

impl<'a, A: Agent, D: Watchdog> Planner<'a, A, D> {
    #[must_use]
    pub fn goal_mode(mut self, mode: GoalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `goal_mode(GoalMode::CheapestOf)`.
    #[must_use]
    pub fn cheapest_of_goals(self) -> Self {
        self.goal_mode(GoalMode::CheapestOf)
    }

    /// Replace the watchdog.
    pub fn watchdog<D2: Watchdog>(self, watchdog: D2) -> Planner<'a, A, D2> {
        Planner {
            agent: self.agent,
            mode: self.mode,
            watchdog,
            sink: self.sink,
            pool: self.pool,
        }
    }

    /// Attach a trace sink.
    #[must_use]
    pub fn trace(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Lease engines from `pool` instead of the process-wide pool.
    #[must_use]
    pub fn pool(mut self, pool: &'a EnginePool<A>) -> Self {
        self.pool = pool;
        self
    }

    /// Lease an engine and seed the frontier.
    ///
    /// # Errors
    ///
    /// Contract violations from initialization. The leased engine is swept
    /// and returned before the error is reported.
    pub fn begin(self) -> Result<ActiveSearch<'a, A, D>, PlanError> {
        let mut search = ActiveSearch {
            agent: self.agent,
            watchdog: self.watchdog,
            tracer: Tracer::new(self.sink),
            engine: self.pool.lease(),
            finished: false,
        };
        search
            .engine
            .initialize(search.agent, self.mode, &mut search.tracer)?;
        Ok(search)
    }

    /// Blocking driver.
    ///
    /// # Errors
    ///
    /// Any [`PlanError`] raised during initialization or expansion.
    pub fn run(self) -> Result<Plan<'a, A>, PlanError> {
        let mut search = self.begin()?;
        loop {
            match search.step()? {
                Expansion::Continue => {}
                Expansion::Suspended => std::thread::yield_now(),
                Expansion::Cancelled | Expansion::Complete => return search.finish(),
            }
        }
    }

    /// Yielding driver for cooperative async schedulers.
    ///
    /// Initialization runs in this call, before the future is returned:
    /// contract violations are detected here and the engine is already
    /// leased and seeded. Expansion happens as the future is polled.
    ///
    /// # Errors
    ///
    /// The future resolves to any [`PlanError`] raised during
    /// initialization or expansion.
    pub fn run_async(self) -> impl Future<Output = Result<Plan<'a, A>, PlanError>> + 'a
    where
        A: 'a,
        D: 'a,
    {
        let started = self.begin();
        async move {
            let mut search = started?;
            loop {
                match search.step()? {
                    Expansion::Continue => {}
                    Expansion::Suspended => tokio::task::yield_now().await,
                    Expansion::Cancelled | Expansion::Complete => return search.finish(),
                }
            }
        }
    }

    /// Step-driven driver. Nothing happens until the first
    /// [`PlanStepper::step`].
    pub fn stepper(self) -> PlanStepper<'a, A, D> {
        PlanStepper {
            phase: Phase::Pending(self),
            state: StepperState::Uninitialized,
            plan: None,
        }
    }
}

/// A running search holding a leased engine.
pub struct ActiveSearch<'a, A: Agent, D> {
    agent: &'a A,
    watchdog: D,
    tracer: Tracer<'a>,
    engine: Lease<'a, SearchEngine<A::World, A::Goal>>,
    finished: bool,
}

impl<'a, A: Agent, D: Watchdog> ActiveSearch<'a, A, D> {
    /// Poll the watchdog and expand at most one node.
    ///
    /// # Errors
    ///
    /// Fatal collaborator failures; see [`PlanError`].
    pub fn step(&mut self) -> Result<Expansion, PlanError> {
        self.engine
            .expand(self.agent, &mut self.watchdog, &mut self.tracer)
    }

    /// Build the plan, sweep the engine and return it to the pool.
    ///
    /// # Errors
    ///
    /// [`PlanError::FrontierInvariant`] if the node table is corrupt.
    pub fn finish(mut self) -> Result<Plan<'a, A>, PlanError> {
        let plan = self.engine.finalize(self.agent, &mut self.tracer);
        self.engine.sweep(self.agent);
        self.finished = true;
        plan
    }
}

impl<A: Agent, D> Drop for ActiveSearch<'_, A, D> {
    fn drop(&mut self) {
        if !self.finished {
            self.engine.sweep(self.agent);
        }
    }
}

/// Lifecycle of a [`PlanStepper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    Uninitialized,
    Running,
    Suspended,
    Finalized,
    Cancelled,
    Faulted,
    Disposed,
}

impl StepperState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Running | Self::Suspended)
    }
}

/// What one [`PlanStepper::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One node was expanded; call again.
    Pending,
    /// The watchdog suspended; call again when convenient.
    Suspended,
    /// The search finished. The plan is available from
    /// [`PlanStepper::take_plan`].
    Done,
}

enum Phase<'a, A: Agent, D> {
    Pending(Planner<'a, A, D>),
    Active(ActiveSearch<'a, A, D>),
    Closed,
}

/// An externally stepped planning call.
pub struct PlanStepper<'a, A: Agent, D = AlwaysContinue> {
    phase: Phase<'a, A, D>,
    state: StepperState,
    plan: Option<Plan<'a, A>>,
}

impl<'a, A: Agent, D: Watchdog> PlanStepper<'a, A, D> {
    #[must_use]
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Advance the search by at most one expansion. The first call
    /// initializes and then expands.
    ///
    /// # Errors
    ///
    /// [`PlanError::AlreadyFinalized`] after completion or a fault,
    /// [`PlanError::Disposed`] after [`dispose`](Self::dispose), otherwise
    /// any error from the search; errors move the stepper to
    /// [`StepperState::Faulted`].
    pub fn step(&mut self) -> Result<StepOutcome, PlanError> {
        match self.state {
            StepperState::Finalized | StepperState::Cancelled | StepperState::Faulted => {
                return Err(PlanError::AlreadyFinalized);
            }
            StepperState::Disposed => return Err(PlanError::Disposed),
            StepperState::Uninitialized | StepperState::Running | StepperState::Suspended => {}
        }
        let result = self.advance();
        if result.is_err() {
            self.phase = Phase::Closed;
            self.state = StepperState::Faulted;
        }
        result
    }

    fn advance(&mut self) -> Result<StepOutcome, PlanError> {
        if let Phase::Pending(_) = self.phase {
            if let Phase::Pending(planner) = mem::replace(&mut self.phase, Phase::Closed) {
                self.phase = Phase::Active(planner.begin()?);
                self.state = StepperState::Running;
            }
        }
        let Phase::Active(search) = &mut self.phase else {
            return Err(PlanError::AlreadyFinalized);
        };
        match search.step()? {
            Expansion::Continue => {
                self.state = StepperState::Running;
                Ok(StepOutcome::Pending)
            }
            Expansion::Suspended => {
                self.state = StepperState::Suspended;
                Ok(StepOutcome::Suspended)
            }
            Expansion::Cancelled | Expansion::Complete => self.complete(),
        }
    }

    fn complete(&mut self) -> Result<StepOutcome, PlanError> {
        let Phase::Active(search) = mem::replace(&mut self.phase, Phase::Closed) else {
            return Err(PlanError::AlreadyFinalized);
        };
        let plan = search.finish()?;
        self.state = match plan.status() {
            PlanStatus::Cancelled | PlanStatus::CancelledButFound => StepperState::Cancelled,
            PlanStatus::FoundPlan | PlanStatus::NotFound => StepperState::Finalized,
        };
        self.plan = Some(plan);
        Ok(StepOutcome::Done)
    }

    /// The plan, once [`StepOutcome::Done`] has been returned.
    #[must_use]
    pub fn plan(&self) -> Option<&Plan<'a, A>> {
        self.plan.as_ref()
    }

    /// Take the plan out of the stepper.
    pub fn take_plan(&mut self) -> Option<Plan<'a, A>> {
        self.plan.take()
    }

    /// Release the engine early. Idempotent; a finished stepper keeps its
    /// state.
    pub fn dispose(&mut self) {
        self.phase = Phase::Closed;
        if !self.state.is_terminal() {
            self.state = StepperState::Disposed;
        }
    }
}
