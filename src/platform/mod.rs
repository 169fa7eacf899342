//! Platform resolver
//!
//! Maps the operating system to the installer artifact, download URL,
//! interpreter version and manager executable. Resolution is a pure
//! function of the OS identifier and the config, so every step that
//! derives a profile gets the same answer.

use crate::config::InstallerConfig;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Operating system family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Os {
    MacOs,
    Linux,
    Windows,
    Unsupported(String),
}

impl Os {
    /// OS the binary is running on
    pub fn detect() -> Self {
        Self::from_id(std::env::consts::OS)
    }

    /// Parse a Rust-style OS identifier (`macos`, `linux`, `windows`)
    pub fn from_id(id: &str) -> Self {
        match id {
            "macos" | "darwin" => Os::MacOs,
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            other => Os::Unsupported(other.to_string()),
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Os::Unsupported(_))
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::MacOs => f.write_str("macos"),
            Os::Linux => f.write_str("linux"),
            Os::Windows => f.write_str("windows"),
            Os::Unsupported(id) => write!(f, "{} (unsupported)", id),
        }
    }
}

/// Everything OS-specific a step needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    pub os: Os,
    /// Installer file name, relative to the work dir. Empty when unsupported.
    pub installer_filename: String,
    /// Empty when unsupported
    pub download_url: String,
    pub python_version: String,
    /// Manager executable before provisioning has discovered anything
    pub manager_executable: PathBuf,
}

impl PlatformProfile {
    pub fn resolve(os: &Os, config: &InstallerConfig) -> Self {
        let artifact = &config.artifact;
        let env = &config.environment;

        let (installer_filename, download_url) = match os {
            Os::MacOs => ("miniconda.sh", artifact.macos_url.clone()),
            Os::Linux => ("miniconda.sh", artifact.linux_url.clone()),
            Os::Windows => ("miniconda.exe", artifact.windows_url.clone()),
            Os::Unsupported(_) => ("", String::new()),
        };

        let python_version = if os.is_windows() {
            env.python_version_windows.clone()
        } else {
            env.python_version_unix.clone()
        };

        let manager_executable = if os.is_windows() {
            windows_manager_path(&config.windows_install_dir())
        } else {
            PathBuf::from("conda")
        };

        Self {
            os: os.clone(),
            installer_filename: installer_filename.to_string(),
            download_url,
            python_version,
            manager_executable,
        }
    }

    /// Profile for the running OS
    pub fn current(config: &InstallerConfig) -> Self {
        Self::resolve(&Os::detect(), config)
    }

    /// Full path of the installer artifact
    pub fn artifact_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.installer_filename)
    }
}

/// `conda.exe` location under a Miniconda install root
pub fn windows_manager_path(install_dir: &Path) -> PathBuf {
    install_dir.join("Scripts").join("conda.exe")
}
