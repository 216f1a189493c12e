//! Domain types for joinwatch
//!
//! This module contains the core domain types:
//! - RegistrationEventKind / EventRecord / Observations: what the event log shows
//! - WatchState / LoopState: per-iteration classification and loop bookkeeping
//! - WatchOutcome: how a run ended and which exit code it maps to

pub mod event;
pub mod outcome;
pub mod state;

pub use event::{EventRecord, Observations, RegistrationEventKind};
pub use outcome::{REBOOT_REQUIRED_EXIT_CODE, SUCCESS_EXIT_CODE, WatchOutcome};
pub use state::{LoopState, WatchState};
