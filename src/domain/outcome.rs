//! Watch run outcome types.
//!
//! The outcome decides the process exit code: 3010 asks the deployment
//! system for a soft reboot, everything else exits 0.

use crate::domain::event::EventRecord;
use crate::report::Reporter;

/// Exit code that tells the deployment system a soft reboot is required
pub const REBOOT_REQUIRED_EXIT_CODE: i32 = 3010;

pub const SUCCESS_EXIT_CODE: i32 = 0;

/// Outcome of a watch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Registration succeeded (306)
    Succeeded(EventRecord),
    /// Pre-check reported the device as already joined (335)
    AlreadyJoined(EventRecord),
    /// Iteration ceiling reached without a terminal event
    TimedOut { iterations: u32 },
}

impl WatchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchOutcome::Succeeded(_) => REBOOT_REQUIRED_EXIT_CODE,
            WatchOutcome::AlreadyJoined(_) | WatchOutcome::TimedOut { .. } => SUCCESS_EXIT_CODE,
        }
    }

    pub fn requires_reboot(&self) -> bool {
        self.exit_code() == REBOOT_REQUIRED_EXIT_CODE
    }

    /// The event that ended the run, if any
    pub fn event(&self) -> Option<&EventRecord> {
        match self {
            WatchOutcome::Succeeded(event) | WatchOutcome::AlreadyJoined(event) => Some(event),
            WatchOutcome::TimedOut { .. } => None,
        }
    }

    /// Write the post-loop summary lines
    pub fn report(&self, reporter: &dyn Reporter) {
        if let Some(event) = self.event() {
            reporter.line(&event.message);
        }
        match self {
            WatchOutcome::Succeeded(_) => {
                reporter.line("Device registration succeeded, a soft reboot is required");
            }
            WatchOutcome::AlreadyJoined(_) => {
                reporter.line("Device is already joined, no reboot required");
            }
            WatchOutcome::TimedOut { iterations } => {
                reporter.line(&format!(
                    "No registration result after {} iterations, exiting without reboot",
                    iterations
                ));
            }
        }
    }
}
