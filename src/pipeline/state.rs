//! Pipeline state machine
//!
//! `Init -> Generated -> SetupDone -> Built -> Repaired -> Packaged -> Done`,
//! with `Aborted` reachable from every non-terminal state. `Done` and `Aborted`
//! are terminal; no transition leaves them.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PipelineState {
    Init,
    Generated,
    SetupDone,
    Built,
    Repaired,
    Packaged,
    Done,
    Aborted,
}

impl PipelineState {
    /// The single forward successor, `None` for terminal states
    pub fn successor(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Init => Some(PipelineState::Generated),
            PipelineState::Generated => Some(PipelineState::SetupDone),
            PipelineState::SetupDone => Some(PipelineState::Built),
            PipelineState::Built => Some(PipelineState::Repaired),
            PipelineState::Repaired => Some(PipelineState::Packaged),
            PipelineState::Packaged => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Aborted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Aborted)
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == PipelineState::Aborted || self.successor() == Some(next)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "Init",
            PipelineState::Generated => "Generated",
            PipelineState::SetupDone => "SetupDone",
            PipelineState::Built => "Built",
            PipelineState::Repaired => "Repaired",
            PipelineState::Packaged => "Packaged",
            PipelineState::Done => "Done",
            PipelineState::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Illegal pipeline transition {from} -> {to}")]
pub struct TransitionError {
    pub from: PipelineState,
    pub to: PipelineState,
}

/// Shared view of the current state and stage for observers outside the
/// pipeline thread, such as the signal handler.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: Arc<Mutex<Tracked>>,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    state: PipelineState,
    stage: Option<Stage>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Tracked {
                state: PipelineState::Init,
                stage: None,
            })),
        }
    }

    pub fn current(&self) -> PipelineState {
        self.read().state
    }

    /// Stage most recently entered, if any
    pub fn stage(&self) -> Option<Stage> {
        self.read().stage
    }

    pub fn enter(&self, stage: Stage) {
        self.update(|t| t.stage = Some(stage));
    }

    fn set(&self, state: PipelineState) {
        self.update(|t| t.state = state);
    }

    fn read(&self) -> Tracked {
        match self.current.lock() {
            Ok(tracked) => *tracked,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Tracked)) {
        match self.current.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl fmt::Display for StageTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracked = self.read();
        match tracked.stage {
            Some(stage) => write!(f, "{} stage (state {})", stage, tracked.state),
            None => write!(f, "state {}", tracked.state),
        }
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// The state machine owned by one pipeline run
#[derive(Debug)]
pub struct StateMachine {
    state: PipelineState,
    history: Vec<PipelineState>,
    tracker: Option<StageTracker>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Init,
            history: vec![PipelineState::Init],
            tracker: None,
        }
    }

    /// Mirrors every transition into `tracker`
    pub fn with_tracker(tracker: StageTracker) -> Self {
        tracker.set(PipelineState::Init);
        Self {
            tracker: Some(tracker),
            ..Self::new()
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn tracker(&self) -> Option<&StageTracker> {
        self.tracker.as_ref()
    }

    /// Every state visited, starting with `Init`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn transition(&mut self, next: PipelineState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        if let Some(tracker) = &self.tracker {
            tracker.set(next);
        }
        Ok(())
    }

    /// Moves to `Aborted`; a no-op once the machine is terminal
    pub fn abort(&mut self) -> PipelineState {
        let from = self.state;
        if self.transition(PipelineState::Aborted).is_err() {
            return from;
        }
        from
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
