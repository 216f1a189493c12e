//! Transcript file that mirrors every status line.
//!
//! The file is opened when the transcript is created and closed when it is
//! dropped. Lines go straight to the file as they are reported, so a run
//! killed part way through still leaves everything up to that point.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{JoinWatchError, Result};
use crate::report::Reporter;

/// Status sink that echoes to stdout and appends to a file
pub struct Transcript {
    path: PathBuf,
    file: Mutex<Option<File>>,
    echo: bool,
}

impl Transcript {
    /// Open (or append to) the transcript at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                JoinWatchError::Transcript(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| JoinWatchError::Transcript(format!("Failed to open {}: {}", path.display(), e)))?;

        let transcript = Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
            echo: true,
        };
        transcript.write_raw(&format!("**** Transcript started {} ****", timestamp()));
        log::info!("Transcript opened: {}", path.display());
        Ok(transcript)
    }

    /// Disable echoing lines to stdout
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn is_open(&self) -> bool {
        self.file.lock().map(|file| file.is_some()).unwrap_or(false)
    }

    /// Write the footer and release the file; later lines only reach stdout
    pub fn close(&self) {
        self.write_raw(&format!("**** Transcript stopped {} ****", timestamp()));
        let file = match self.file.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(file) = file {
            if let Err(e) = file.sync_all() {
                log::warn!("Failed to sync transcript {}: {}", self.path.display(), e);
            }
        }
    }

    fn write_raw(&self, text: &str) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", text) {
                log::warn!("Failed to write transcript {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Reporter for Transcript {
    fn line(&self, message: &str) {
        if self.echo {
            println!("{}", message);
        }
        self.write_raw(&format!("[{}] {}", timestamp(), message));
    }
}

impl Drop for Transcript {
    fn drop(&mut self) {
        if self.is_open() {
            self.close();
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("transcript.log");
        {
            let transcript = Transcript::open(&path).unwrap().quiet();
            assert!(transcript.is_open());
        }
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Transcript started"));
    }

    #[test]
    fn test_lines_mirrored_and_footer_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.log");
        {
            let transcript = Transcript::open(&path).unwrap().quiet();
            transcript.line("Checking event log");
            transcript.line("dc01.corp.contoso.com reachable");
        }
        let contents = fs::read_to_string(&path).unwrap();
        let started = contents.find("Transcript started").unwrap();
        let line = contents.find("Checking event log").unwrap();
        let stopped = contents.find("Transcript stopped").unwrap();
        assert!(started < line && line < stopped);
        assert!(contents.contains("dc01.corp.contoso.com reachable"));
    }

    #[test]
    fn test_lines_on_disk_while_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.log");
        let transcript = Transcript::open(&path).unwrap().quiet();
        for check in 1..=40 {
            transcript.line(&format!("No registration result yet (check {}/60)", check));
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert!(transcript.is_open());
        assert!(contents.contains("Transcript started"));
        assert!(contents.contains("(check 1/60)"));
        assert!(contents.contains("(check 40/60)"));
        assert!(!contents.contains("Transcript stopped"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.log");
        let transcript = Transcript::open(&path).unwrap().quiet();
        transcript.close();
        assert!(!transcript.is_open());
        transcript.line("after close");
        drop(transcript);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Transcript stopped").count(), 1);
        assert!(!contents.contains("after close"));
    }

    #[test]
    fn test_open_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.log");
        fs::write(&path, "previous run\n").unwrap();
        drop(Transcript::open(&path).unwrap().quiet());
        assert!(fs::read_to_string(&path).unwrap().starts_with("previous run\n"));
    }
}
