//! Watch loop state.

use std::fmt;

/// Classification of one watch iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No iteration has been classified yet
    Polling,
    /// Registration succeeded (306)
    Succeeded,
    /// Pre-check reports the device is already joined (335)
    AlreadyJoined,
    /// Pre-check found no DC (334) but one is reachable now
    PrecheckBlocked,
    /// A join attempt failed (304) and is being retried
    JoinFailedRetry,
    /// Nothing actionable observed
    NoSignal,
}

impl WatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WatchState::Succeeded | WatchState::AlreadyJoined)
    }
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WatchState::Polling => "polling",
            WatchState::Succeeded => "succeeded",
            WatchState::AlreadyJoined => "already-joined",
            WatchState::PrecheckBlocked => "precheck-blocked",
            WatchState::JoinFailedRetry => "join-failed-retry",
            WatchState::NoSignal => "no-signal",
        };
        write!(f, "{}", s)
    }
}

/// Iteration counter and terminal flag for one watch run
#[derive(Debug, Clone)]
pub struct LoopState {
    iteration: u32,
    max_iterations: u32,
    current: WatchState,
}

impl LoopState {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            current: WatchState::Polling,
        }
    }

    /// Completed iterations
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn current(&self) -> WatchState {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn is_exhausted(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    pub fn should_continue(&self) -> bool {
        !self.is_terminal() && !self.is_exhausted()
    }

    /// Record the classification of the iteration just run
    pub fn advance(&mut self, state: WatchState) {
        self.current = state;
        self.iteration = self.iteration.saturating_add(1);
    }
}
