//! Registration watcher - the bounded polling loop.
//!
//! This module provides:
//! - RegistrationWatcher: polls the event log and decides what to do each iteration
//! - WatcherConfig: cadence, ceiling and probe settings
//! - Sleeper: the suspension seam between iterations

mod sleeper;
mod watcher;

pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
pub use watcher::{RegistrationWatcher, WatcherConfig};
