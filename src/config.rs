//! Configuration management for the installer
//!
//! Every version string, URL and command the pipeline uses lives here, so
//! steps never carry inline literals. Built-in defaults reproduce the stock
//! Auto-Coder setup; a TOML file may override any section.
//! Location: ~/.autocoder-installer/config.toml

use crate::errors::{InstallerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete installer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallerConfig {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Target environment and package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub package: String,
    pub python_version_windows: String,
    pub python_version_unix: String,
}

/// Where the Miniconda installer comes from and where it goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub macos_url: String,
    pub linux_url: String,
    pub windows_url: String,
    /// Directory the installer file is downloaded into
    pub work_dir: String,
    /// Silent-install target on Windows
    pub windows_install_dir: String,
}

/// Commands run inside the environment after the package is installed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub cluster: Vec<String>,
    pub storage: Vec<String>,
}

/// Per-category subprocess deadlines, in seconds. Zero disables the deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub download_secs: u64,
    pub install_secs: u64,
    pub command_secs: u64,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "auto-coder".to_string(),
            package: "auto-coder".to_string(),
            python_version_windows: "3.11.9".to_string(),
            python_version_unix: "3.10.11".to_string(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            macos_url: "https://repo.anaconda.com/miniconda/Miniconda3-latest-MacOSX-x86_64.sh"
                .to_string(),
            linux_url: "https://repo.anaconda.com/miniconda/Miniconda3-latest-Linux-x86_64.sh"
                .to_string(),
            windows_url: "https://repo.anaconda.com/miniconda/Miniconda3-latest-Windows-x86_64.exe"
                .to_string(),
            work_dir: ".".to_string(),
            windows_install_dir: "~/Miniconda3".to_string(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            cluster: vec!["ray".into(), "start".into(), "--head".into()],
            storage: vec!["byzerllm".into(), "storage".into(), "start".into()],
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            download_secs: 900,
            install_secs: 1800,
            command_secs: 1800,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl TimeoutsConfig {
    fn deadline(secs: u64) -> Option<Duration> {
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    pub fn download(&self) -> Option<Duration> {
        Self::deadline(self.download_secs)
    }

    pub fn install(&self) -> Option<Duration> {
        Self::deadline(self.install_secs)
    }

    pub fn command(&self) -> Option<Duration> {
        Self::deadline(self.command_secs)
    }
}

impl InstallerConfig {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InstallerError::Config(format!("Failed to read config: {}", e)))?;

        let config: InstallerConfig = toml::from_str(&contents)
            .map_err(|e| InstallerError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(InstallerConfig::default())
    }

    /// Standard config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".autocoder-installer").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.environment.name.trim().is_empty() {
            return Err(InstallerError::Config(
                "environment.name must not be empty".to_string(),
            ));
        }

        if self.environment.package.trim().is_empty() {
            return Err(InstallerError::Config(
                "environment.package must not be empty".to_string(),
            ));
        }

        if self.environment.python_version_windows.trim().is_empty()
            || self.environment.python_version_unix.trim().is_empty()
        {
            return Err(InstallerError::Config(
                "python versions must not be empty".to_string(),
            ));
        }

        if self.services.cluster.is_empty() || self.services.storage.is_empty() {
            return Err(InstallerError::Config(
                "service commands must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| InstallerError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                InstallerError::Config(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| InstallerError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Directory holding the downloaded installer
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.artifact.work_dir)
    }

    /// Windows silent-install target directory
    pub fn windows_install_dir(&self) -> PathBuf {
        Self::expand_path(&self.artifact.windows_install_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = InstallerConfig::default();
        assert_eq!(config.environment.name, "auto-coder");
        assert_eq!(config.environment.python_version_windows, "3.11.9");
        assert_eq!(config.environment.python_version_unix, "3.10.11");
        assert_eq!(config.services.cluster, vec!["ray", "start", "--head"]);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(InstallerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_env_name() {
        let mut config = InstallerConfig::default();
        config.environment.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_service() {
        let mut config = InstallerConfig::default();
        config.services.storage.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let mut config = InstallerConfig::default();
        config.timeouts.command_secs = 0;
        assert!(config.timeouts.command().is_none());
        assert_eq!(config.timeouts.install(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[environment]\nname = \"sandbox\"\n").unwrap();

        let config = InstallerConfig::load(Some(path)).unwrap();
        assert_eq!(config.environment.name, "sandbox");
        assert_eq!(config.environment.package, "auto-coder");
        assert_eq!(config.timeouts.download_secs, 900);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = InstallerConfig::default();
        config.timeouts.download_secs = 42;
        config.save(&path).unwrap();

        let loaded = InstallerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.timeouts.download_secs, 42);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[services]\ncluster = []\n").unwrap();

        assert!(InstallerConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = InstallerConfig::expand_path("~/Miniconda3");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let expanded = InstallerConfig::expand_path("/opt/miniconda");
        assert_eq!(expanded, PathBuf::from("/opt/miniconda"));
    }
}
