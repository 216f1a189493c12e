//! Device registration event types.
//!
//! Four event ids from the device registration channel drive the watch loop.
//! Each poll reads at most the most recent record of each kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The event categories the watcher observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationEventKind {
    /// Automatic registration attempt failed
    JoinFailed,
    /// Automatic registration succeeded
    RegistrationSucceeded,
    /// Pre-check could not find a domain controller
    PrecheckNoDc,
    /// Pre-check found the device already joined
    PrecheckAlreadyJoined,
}

impl RegistrationEventKind {
    /// All kinds, in the order they are queried
    pub const ALL: [RegistrationEventKind; 4] = [
        RegistrationEventKind::JoinFailed,
        RegistrationEventKind::RegistrationSucceeded,
        RegistrationEventKind::PrecheckNoDc,
        RegistrationEventKind::PrecheckAlreadyJoined,
    ];

    /// Event log record id
    pub fn event_id(self) -> u32 {
        match self {
            RegistrationEventKind::JoinFailed => 304,
            RegistrationEventKind::RegistrationSucceeded => 306,
            RegistrationEventKind::PrecheckNoDc => 334,
            RegistrationEventKind::PrecheckAlreadyJoined => 335,
        }
    }

    pub fn from_event_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_id() == id)
    }
}

impl fmt::Display for RegistrationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrationEventKind::JoinFailed => "JoinFailed",
            RegistrationEventKind::RegistrationSucceeded => "RegistrationSucceeded",
            RegistrationEventKind::PrecheckNoDc => "PrecheckNoDC",
            RegistrationEventKind::PrecheckAlreadyJoined => "PrecheckAlreadyJoined",
        };
        write!(f, "{}({})", name, self.event_id())
    }
}

/// Most recent log record matching one event kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: RegistrationEventKind,
    /// Timestamp as rendered by the event log, if present
    pub time_created: Option<String>,
    /// Rendered event message
    pub message: String,
}

impl EventRecord {
    pub fn new(kind: RegistrationEventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            time_created: None,
            message: message.into(),
        }
    }

    pub fn with_time(mut self, time_created: impl Into<String>) -> Self {
        self.time_created = Some(time_created.into());
        self
    }
}

/// What one poll of the event log saw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observations {
    pub join_failed: Option<EventRecord>,
    pub succeeded: Option<EventRecord>,
    pub precheck_no_dc: Option<EventRecord>,
    pub already_joined: Option<EventRecord>,
}

impl Observations {
    /// Store a record in the slot for its kind
    pub fn record(&mut self, event: EventRecord) {
        let slot = match event.kind {
            RegistrationEventKind::JoinFailed => &mut self.join_failed,
            RegistrationEventKind::RegistrationSucceeded => &mut self.succeeded,
            RegistrationEventKind::PrecheckNoDc => &mut self.precheck_no_dc,
            RegistrationEventKind::PrecheckAlreadyJoined => &mut self.already_joined,
        };
        *slot = Some(event);
    }

    pub fn get(&self, kind: RegistrationEventKind) -> Option<&EventRecord> {
        match kind {
            RegistrationEventKind::JoinFailed => self.join_failed.as_ref(),
            RegistrationEventKind::RegistrationSucceeded => self.succeeded.as_ref(),
            RegistrationEventKind::PrecheckNoDc => self.precheck_no_dc.as_ref(),
            RegistrationEventKind::PrecheckAlreadyJoined => self.already_joined.as_ref(),
        }
    }

    pub fn contains(&self, kind: RegistrationEventKind) -> bool {
        self.get(kind).is_some()
    }
}
