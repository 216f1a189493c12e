use async_trait::async_trait;

use crate::domain::{EventRecord, RegistrationEventKind};
use crate::error::Result;

/// Read access to the device registration event channel
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Most recent record of `kind`, or None when the log has no match
    async fn latest(&self, kind: RegistrationEventKind) -> Result<Option<EventRecord>>;
}
