//! Registration watcher implementation.
//!
//! Each iteration reads the four registration event kinds, classifies them in
//! strict priority order and acts:
//! 1. 335 (already joined) ends the run
//! 2. 306 (registration succeeded) ends the run
//! 3. 334 without 304, with a DC reachable now: start the join task, wait
//! 4. otherwise wait; after a 304 also restart the join task and wait a bit more
//!
//! The loop gives up after `max_iterations` without treating that as an error.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::Config;
use crate::domain::{LoopState, Observations, RegistrationEventKind, WatchOutcome, WatchState};
use crate::eventlog::EventSource;
use crate::probe::ReachabilityCheck;
use crate::report::Reporter;
use crate::runner::sleeper::Sleeper;
use crate::task::TaskTrigger;

/// Configuration for the RegistrationWatcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Domain whose controllers are probed
    pub domain: String,
    /// Iteration ceiling
    pub max_iterations: u32,
    /// Sleep after every non-terminal iteration
    pub interval: Duration,
    /// Extra sleep after restarting the task for a failed join
    pub retry_extra: Duration,
    /// Probe every DC instead of stopping at the first healthy one
    pub exhaustive_probe: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for WatcherConfig {
    fn from(config: &Config) -> Self {
        Self {
            domain: config.probe.domain.clone(),
            max_iterations: config.watch.max_iterations,
            interval: Duration::from_secs(config.watch.interval_secs),
            retry_extra: Duration::from_secs(config.watch.retry_extra_secs),
            exhaustive_probe: config.watch.exhaustive_probe,
        }
    }
}

pub struct RegistrationWatcher<E, C, T, S>
where
    E: EventSource,
    C: ReachabilityCheck,
    T: TaskTrigger,
    S: Sleeper,
{
    events: Arc<E>,
    reachability: Arc<C>,
    task: Arc<T>,
    sleeper: Arc<S>,
    reporter: Arc<dyn Reporter>,
    config: WatcherConfig,
}

impl<E, C, T, S> RegistrationWatcher<E, C, T, S>
where
    E: EventSource,
    C: ReachabilityCheck,
    T: TaskTrigger,
    S: Sleeper,
{
    pub fn new(
        events: Arc<E>,
        reachability: Arc<C>,
        task: Arc<T>,
        sleeper: Arc<S>,
        reporter: Arc<dyn Reporter>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            events,
            reachability,
            task,
            sleeper,
            reporter,
            config,
        }
    }

    /// Poll until a terminal event shows up or the ceiling is reached.
    pub async fn run(&self) -> WatchOutcome {
        let mut state = LoopState::new(self.config.max_iterations);
        self.reporter.line(&format!(
            "Watching device registration for {} (up to {} checks, {}s apart)",
            self.config.domain,
            self.config.max_iterations,
            self.config.interval.as_secs()
        ));

        while state.should_continue() {
            let observations = self.poll().await;
            if let Some(outcome) = self.step(&mut state, &observations).await {
                return outcome;
            }
        }

        info!("Watch ceiling of {} iterations reached", state.max_iterations());
        WatchOutcome::TimedOut {
            iterations: state.iteration(),
        }
    }

    /// Read the newest record of every event kind; query errors count as "not observed"
    pub async fn poll(&self) -> Observations {
        let mut observations = Observations::default();
        for kind in RegistrationEventKind::ALL {
            match self.events.latest(kind).await {
                Ok(Some(event)) => observations.record(event),
                Ok(None) => {}
                Err(e) => debug!("Event query for {} failed: {}", kind, e),
            }
        }
        observations
    }

    /// Run one iteration against `observations`.
    ///
    /// Returns the outcome when a terminal event ends the run.
    pub async fn step(&self, state: &mut LoopState, observations: &Observations) -> Option<WatchOutcome> {
        let next = self.classify(observations).await;
        state.advance(next);
        info!(
            "Iteration {}/{}: {}",
            state.iteration(),
            state.max_iterations(),
            next
        );

        match next {
            WatchState::AlreadyJoined => {
                return observations.already_joined.clone().map(WatchOutcome::AlreadyJoined);
            }
            WatchState::Succeeded => {
                return observations.succeeded.clone().map(WatchOutcome::Succeeded);
            }
            WatchState::PrecheckBlocked => {
                self.reporter.line(
                    "Pre-check could not find a domain controller but one is reachable now, restarting device join",
                );
                self.trigger_task().await;
                self.sleeper.sleep(self.config.interval).await;
            }
            WatchState::JoinFailedRetry => {
                self.reporter.line("Device join failed, waiting before retrying");
                self.sleeper.sleep(self.config.interval).await;
                self.trigger_task().await;
                self.sleeper.sleep(self.config.retry_extra).await;
            }
            WatchState::NoSignal | WatchState::Polling => {
                self.reporter.line(&format!(
                    "No registration result yet (check {}/{})",
                    state.iteration(),
                    state.max_iterations()
                ));
                self.sleeper.sleep(self.config.interval).await;
            }
        }
        None
    }

    /// Priority-ordered classification. The prober is only consulted when a
    /// 334 is present and no 304 is.
    async fn classify(&self, observations: &Observations) -> WatchState {
        if observations.contains(RegistrationEventKind::PrecheckAlreadyJoined) {
            return WatchState::AlreadyJoined;
        }
        if observations.contains(RegistrationEventKind::RegistrationSucceeded) {
            return WatchState::Succeeded;
        }
        if observations.contains(RegistrationEventKind::PrecheckNoDc)
            && !observations.contains(RegistrationEventKind::JoinFailed)
            && self
                .reachability
                .is_reachable(&self.config.domain, self.config.exhaustive_probe)
                .await
        {
            return WatchState::PrecheckBlocked;
        }
        if observations.contains(RegistrationEventKind::JoinFailed) {
            WatchState::JoinFailedRetry
        } else {
            WatchState::NoSignal
        }
    }

    async fn trigger_task(&self) {
        match self.task.trigger().await {
            Ok(()) => self
                .reporter
                .line(&format!("Started scheduled task {}", self.task.task_name())),
            Err(e) => {
                warn!("Failed to start {}: {}", self.task.task_name(), e);
                self.reporter.line(&format!(
                    "Could not start scheduled task {}: {}",
                    self.task.task_name(),
                    e
                ));
            }
        }
    }
}
