//! Scheduled task control
//!
//! The watcher re-runs the device-join task through `TaskTrigger`.

pub mod schtasks;

use async_trait::async_trait;

use crate::error::Result;

pub use schtasks::SchtasksTrigger;

/// Starts the corrective device-join task
#[async_trait]
pub trait TaskTrigger: Send + Sync {
    async fn trigger(&self) -> Result<()>;

    /// Human-readable task identifier
    fn task_name(&self) -> &str;
}
