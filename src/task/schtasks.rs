//! `schtasks /Run` backed trigger.

use std::process::Stdio;

use async_trait::async_trait;
use log::info;
use tokio::process::Command;

use crate::config::TaskConfig;
use crate::error::{JoinWatchError, Result};
use crate::task::TaskTrigger;

pub struct SchtasksTrigger {
    full_name: String,
}

impl SchtasksTrigger {
    /// `path` is the task folder (e.g. `\Microsoft\Windows\Workplace Join\`)
    pub fn new(path: &str, name: &str) -> Self {
        Self {
            full_name: join_task_path(path, name),
        }
    }

    pub fn from_config(config: &TaskConfig) -> Self {
        Self::new(&config.path, &config.name)
    }

    pub fn run_args(&self) -> Vec<String> {
        vec!["/Run".to_string(), "/TN".to_string(), self.full_name.clone()]
    }
}

#[async_trait]
impl TaskTrigger for SchtasksTrigger {
    async fn trigger(&self) -> Result<()> {
        info!("Starting scheduled task {}", self.full_name);
        let output = Command::new("schtasks")
            .args(self.run_args())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| JoinWatchError::Task(format!("schtasks could not run: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(JoinWatchError::Task(format!(
                "{} failed with exit code {:?}: {}",
                self.full_name,
                output.status.code(),
                stderr.trim()
            )))
        }
    }

    fn task_name(&self) -> &str {
        &self.full_name
    }
}

/// Join a task folder and name with exactly one backslash between them
fn join_task_path(path: &str, name: &str) -> String {
    let folder = path.trim().trim_end_matches('\\');
    let name = name.trim().trim_start_matches('\\');
    if folder.is_empty() {
        format!("\\{}", name)
    } else if folder.starts_with('\\') {
        format!("{}\\{}", folder, name)
    } else {
        format!("\\{}\\{}", folder, name)
    }
}
