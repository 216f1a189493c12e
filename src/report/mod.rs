//! Operator-facing output.
//!
//! Status lines go to a `Reporter`. The production reporter is the
//! `Transcript`, which echoes to stdout and mirrors into a file.

pub mod marker;
pub mod transcript;

use std::sync::Mutex;

pub use marker::write_marker;
pub use transcript::Transcript;

/// Sink for human-readable status lines
pub trait Reporter: Send + Sync {
    fn line(&self, message: &str);
}

/// Reporter that only prints to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn line(&self, message: &str) {
        println!("{}", message);
    }
}

/// Reporter that keeps lines in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn line(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_collects_lines() {
        let reporter = MemoryReporter::new();
        reporter.line("first");
        reporter.line("second");
        assert_eq!(reporter.lines(), vec!["first", "second"]);
        assert!(reporter.contains("sec"));
        assert!(!reporter.contains("third"));
    }

    #[test]
    fn test_reporter_as_trait_object() {
        let reporter = MemoryReporter::new();
        let sink: &dyn Reporter = &reporter;
        sink.line("via trait");
        assert_eq!(reporter.lines().len(), 1);
    }
}
