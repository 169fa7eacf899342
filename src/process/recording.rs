//! Scripted runner that records issued commands instead of spawning them

use crate::errors::{InstallerError, Result};
use crate::process::cancel::CancelSignal;
use crate::process::command::{CommandOutput, CommandSpec};
use crate::process::runner::CommandRunner;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Scripted response for commands whose rendered text contains a fragment
#[derive(Debug, Clone)]
enum Script {
    Exit(i32),
    Timeout,
    SpawnError,
}

/// Command runner for tests and dry runs.
///
/// Every command succeeds with exit code 0 unless a rule registered with
/// [`fail_on`](Self::fail_on) or [`timeout_on`](Self::timeout_on) matches.
/// Matching is substring-based on the command's display form.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    issued: Mutex<Vec<CommandSpec>>,
    on_path: HashMap<String, PathBuf>,
    scripts: Vec<(String, Script)>,
    creates: Vec<(String, PathBuf)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `name` as present on the search path at `path`
    pub fn with_program_on_path(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.on_path.insert(name.to_string(), path.into());
        self
    }

    /// Matching commands exit with `code`
    pub fn fail_on(mut self, fragment: &str, code: i32) -> Self {
        self.scripts.push((fragment.to_string(), Script::Exit(code)));
        self
    }

    /// Matching commands overrun their deadline
    pub fn timeout_on(mut self, fragment: &str) -> Self {
        self.scripts.push((fragment.to_string(), Script::Timeout));
        self
    }

    /// Matching commands cannot be started
    pub fn spawn_error_on(mut self, fragment: &str) -> Self {
        self.scripts.push((fragment.to_string(), Script::SpawnError));
        self
    }

    /// When a matching command runs, create `path` whatever its exit code
    /// (simulates a download or installer writing to disk, partially or not)
    pub fn creates_file_on(mut self, fragment: &str, path: impl Into<PathBuf>) -> Self {
        self.creates.push((fragment.to_string(), path.into()));
        self
    }

    /// Commands issued so far, in order
    pub fn issued(&self) -> Vec<CommandSpec> {
        self.lock().clone()
    }

    pub fn issued_count(&self) -> usize {
        self.lock().len()
    }

    /// Whether any issued command contains `fragment`
    pub fn was_issued(&self, fragment: &str) -> bool {
        self.lock()
            .iter()
            .any(|spec| spec.to_string().contains(fragment))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CommandSpec>> {
        self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        deadline: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<CommandOutput> {
        let rendered = spec.to_string();
        let program = spec.program_name();
        self.lock().push(spec.clone());

        if cancel.is_cancelled() {
            return Err(InstallerError::Cancelled { program });
        }

        let script = self
            .scripts
            .iter()
            .find(|(fragment, _)| rendered.contains(fragment.as_str()))
            .map(|(_, script)| script.clone());

        match script {
            Some(Script::Timeout) => {
                return Err(InstallerError::Timeout {
                    program,
                    secs: deadline.map(|d| d.as_secs()).unwrap_or_default(),
                })
            }
            Some(Script::SpawnError) => {
                return Err(InstallerError::Spawn {
                    program,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
            }
            _ => {}
        }

        for (fragment, path) in &self.creates {
            if rendered.contains(fragment.as_str()) {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, b"")?;
            }
        }

        Ok(match script {
            Some(Script::Exit(code)) => CommandOutput {
                exit_code: Some(code),
                output: format!("{}: exited with {}\n", program, code),
                duration: Duration::ZERO,
            },
            _ => CommandOutput {
                exit_code: Some(0),
                output: format!("ran: {}\n", rendered),
                duration: Duration::ZERO,
            },
        })
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.on_path.get(name).cloned()
    }
}
