//! Error types for joinwatch
//!
//! Centralized error handling using thiserror. None of these are fatal to the
//! watch loop; they surface at the capability seams and are logged there.

use thiserror::Error;

/// All error types that can occur in joinwatch
#[derive(Debug, Error)]
pub enum JoinWatchError {
    /// SRV resolution failed
    #[error("DNS error: {0}")]
    Dns(String),

    /// Reachability probe could not run
    #[error("Probe error: {0}")]
    Probe(String),

    /// Event log query failed
    #[error("Event log error: {0}")]
    EventLog(String),

    /// Scheduled task could not be started
    #[error("Task error: {0}")]
    Task(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Transcript or marker file error
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for joinwatch operations
pub type Result<T> = std::result::Result<T, JoinWatchError>;
