//! joinwatch - Autopilot Hybrid Join registration watcher
//!
//! Polls the device registration event log and domain controller
//! reachability until Azure AD device registration completes, restarting the
//! device-join scheduled task when it is worth retrying. The run ends with
//! exit code 3010 when a reboot is needed.

pub mod config;
pub mod domain;
pub mod error;
pub mod eventlog;
pub mod probe;
pub mod report;
pub mod runner;
pub mod task;

pub use error::{JoinWatchError, Result};
