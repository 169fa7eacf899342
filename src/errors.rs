//! Error types for the Auto-Coder installer
//!
//! Every fallible operation below the binary edge returns [`InstallerError`].
//! Steps never propagate these across the pipeline; they fold them into a
//! [`StepErrorKind`] on their outcome instead.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Running OS has no installer artifact
    #[error("No Miniconda installer available for platform {0}")]
    UnsupportedPlatform(String),

    /// External command ran but did not exit cleanly
    #[error("`{command}` {}", describe_exit(.code))]
    CommandFailed { command: String, code: Option<i32> },

    /// External command could not be started at all
    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Deadline elapsed before the command exited
    #[error("Command `{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// Operator cancelled while the command was running
    #[error("Command `{program}` was cancelled")]
    Cancelled { program: String },

    /// Installer artifact is not on disk
    #[error("{file} not found in {}.", .dir.display())]
    ArtifactMissing { file: String, dir: PathBuf },

    /// Manager executable absent after installation
    #[error("Miniconda installation may have failed. Conda not found at: {}", .0.display())]
    ManagerMissing(PathBuf),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Failure category recorded on a step outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorKind {
    UnsupportedPlatform,
    Transfer,
    Installer,
    Command,
    TimedOut,
    Cancelled,
    /// Prerequisite step failed, so this one never ran
    Skipped,
}

impl InstallerError {
    /// Classify this error for a step, given the kind a plain command
    /// failure should count as in that step.
    pub fn kind(&self, failure_kind: StepErrorKind) -> StepErrorKind {
        match self {
            InstallerError::UnsupportedPlatform(_) => StepErrorKind::UnsupportedPlatform,
            InstallerError::Timeout { .. } => StepErrorKind::TimedOut,
            InstallerError::Cancelled { .. } => StepErrorKind::Cancelled,
            InstallerError::ArtifactMissing { .. } | InstallerError::ManagerMissing(_) => {
                StepErrorKind::Installer
            }
            _ => failure_kind,
        }
    }
}

impl std::fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepErrorKind::UnsupportedPlatform => "unsupported platform",
            StepErrorKind::Transfer => "transfer failed",
            StepErrorKind::Installer => "installer failed",
            StepErrorKind::Command => "command failed",
            StepErrorKind::TimedOut => "timed out",
            StepErrorKind::Cancelled => "cancelled",
            StepErrorKind::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InstallerError::Timeout {
            program: "wget".to_string(),
            secs: 600,
        };
        assert!(err.to_string().contains("wget"));
        assert!(err.to_string().contains("600"));
    }

    #[test]
    fn test_manager_missing_mentions_path() {
        let err = InstallerError::ManagerMissing(PathBuf::from("C:/Miniconda3/Scripts/conda.exe"));
        assert!(err.to_string().contains("conda.exe"));
    }

    #[test]
    fn test_kind_mapping() {
        let timeout = InstallerError::Timeout {
            program: "bash".to_string(),
            secs: 1,
        };
        assert_eq!(timeout.kind(StepErrorKind::Installer), StepErrorKind::TimedOut);

        let failed = InstallerError::CommandFailed {
            command: "wget -O miniconda.sh".to_string(),
            code: Some(4),
        };
        assert_eq!(failed.kind(StepErrorKind::Transfer), StepErrorKind::Transfer);

        let missing = InstallerError::ArtifactMissing {
            file: "miniconda.exe".to_string(),
            dir: PathBuf::from("C:/work"),
        };
        assert_eq!(missing.kind(StepErrorKind::Command), StepErrorKind::Installer);

        let unsupported = InstallerError::UnsupportedPlatform("haiku".to_string());
        assert_eq!(
            unsupported.kind(StepErrorKind::Transfer),
            StepErrorKind::UnsupportedPlatform
        );
    }

    #[test]
    fn test_command_failed_display() {
        let exited = InstallerError::CommandFailed {
            command: "bash miniconda.sh -b".to_string(),
            code: Some(2),
        };
        assert_eq!(exited.to_string(), "`bash miniconda.sh -b` exited with code 2");

        let killed = InstallerError::CommandFailed {
            command: "ray start --head".to_string(),
            code: None,
        };
        assert!(killed.to_string().ends_with("was terminated by a signal"));
    }

    #[test]
    fn test_artifact_missing_display() {
        let err = InstallerError::ArtifactMissing {
            file: "miniconda.exe".to_string(),
            dir: PathBuf::from("work"),
        };
        assert_eq!(err.to_string(), "miniconda.exe not found in work.");
    }
}
