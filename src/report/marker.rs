//! Installation marker written for the deployment system's detection rule.

use crate::error::{JoinWatchError, Result};
use std::fs;
use std::path::Path;

/// Write the marker file, creating parent directories as needed
pub fn write_marker(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| JoinWatchError::Transcript(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let contents = format!(
        "{} {} installed {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().to_rfc3339()
    );
    fs::write(path, contents)
        .map_err(|e| JoinWatchError::Transcript(format!("Failed to write marker {}: {}", path.display(), e)))?;

    log::info!("Wrote marker file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_marker_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("joinwatch.tag");

        write_marker(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("joinwatch "));
        assert!(contents.contains("installed"));
    }

    #[test]
    fn test_write_marker_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("joinwatch.tag");
        fs::write(&path, "stale").unwrap();

        write_marker(&path).unwrap();

        assert!(!fs::read_to_string(&path).unwrap().contains("stale"));
    }
}
