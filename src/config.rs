use crate::error::{JoinWatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Domain probed when no config overrides it
pub const DEFAULT_DOMAIN: &str = "corp.contoso.com";

/// Event channel the device registration service writes to
pub const DEFAULT_EVENT_CHANNEL: &str = "Microsoft-Windows-User Device Registration/Admin";

pub const DEFAULT_TASK_PATH: &str = r"\Microsoft\Windows\Workplace Join\";
pub const DEFAULT_TASK_NAME: &str = "Automatic-Device-Join";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub watch: WatchConfig,
    pub probe: ProbeConfig,
    pub events: EventsConfig,
    pub task: TaskConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub max_iterations: u32,
    pub interval_secs: u64,
    pub retry_extra_secs: u64,
    pub exhaustive_probe: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            interval_secs: 60,
            retry_extra_secs: 5,
            exhaustive_probe: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub domain: String,
    pub ldap_port: u16,
    pub ping_count: u32,
    pub connect_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            ldap_port: 389,
            ping_count: 2,
            connect_timeout_ms: 3000,
        }
    }
}

impl ProbeConfig {
    /// Timeout for a single ping reply or TCP connect
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub channel: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_EVENT_CHANNEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub path: String,
    pub name: String,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_TASK_PATH.to_string(),
            name: DEFAULT_TASK_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub transcript: PathBuf,
    pub marker: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let base = program_data_dir().join(env!("CARGO_PKG_NAME"));
        Self {
            transcript: base.join("transcript.log"),
            marker: base.join(format!("{}.tag", env!("CARGO_PKG_NAME"))),
        }
    }
}

/// Machine-wide data directory: %ProgramData% on Windows, the user's local
/// data directory elsewhere.
fn program_data_dir() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            watch: WatchConfig::default(),
            probe: ProbeConfig::default(),
            events: EventsConfig::default(),
            task: TaskConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path must load or the run fails
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            JoinWatchError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject settings the watch loop cannot run with. Called once command
    /// line overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        if self.watch.max_iterations == 0 {
            return Err(JoinWatchError::Config("watch.max_iterations must be at least 1".to_string()));
        }
        if self.probe.domain.trim().is_empty() {
            return Err(JoinWatchError::Config("probe.domain must not be empty".to_string()));
        }
        if self.task.name.trim().is_empty() {
            return Err(JoinWatchError::Config("task.name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_builtin_behavior() {
        let config = Config::default();
        assert_eq!(config.watch.max_iterations, 60);
        assert_eq!(config.watch.interval_secs, 60);
        assert_eq!(config.watch.retry_extra_secs, 5);
        assert!(!config.watch.exhaustive_probe);
        assert_eq!(config.probe.domain, DEFAULT_DOMAIN);
        assert_eq!(config.probe.ldap_port, 389);
        assert_eq!(config.task.name, "Automatic-Device-Join");
        assert_eq!(config.events.channel, DEFAULT_EVENT_CHANNEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "probe:\n  domain: ad.example.org\nwatch:\n  max_iterations: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.probe.domain, "ad.example.org");
        assert_eq!(config.probe.ldap_port, 389);
        assert_eq!(config.watch.max_iterations, 5);
        assert_eq!(config.watch.interval_secs, 60);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("joinwatch.yml");
        fs::write(&path, "log_level: debug\ntask:\n  name: Custom-Join\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.task.name, "Custom-Join");
        assert_eq!(config.task.path, DEFAULT_TASK_PATH);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, JoinWatchError::Config(_)));
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yml");
        fs::write(&path, "watch: [not, a, map").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(JoinWatchError::Yaml(_))));
    }

    #[test]
    fn test_load_defers_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("joinwatch.yml");
        fs::write(&path, "watch:\n  max_iterations: 0\n").unwrap();

        let mut config = Config::load(Some(&path)).unwrap();
        assert!(config.validate().is_err());
        config.watch.max_iterations = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connect_timeout() {
        let probe = ProbeConfig {
            connect_timeout_ms: 1500,
            ..ProbeConfig::default()
        };
        assert_eq!(probe.connect_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let mut config = Config::default();
        config.watch.max_iterations = 0;
        assert!(matches!(config.validate(), Err(JoinWatchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_domain() {
        let mut config = Config::default();
        config.probe.domain = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_task_name() {
        let mut config = Config::default();
        config.task.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_paths_share_directory() {
        let paths = PathsConfig::default();
        assert_eq!(paths.transcript.parent(), paths.marker.parent());
        assert!(paths.marker.to_string_lossy().ends_with("joinwatch.tag"));
    }
}
