//! Command runner trait and the real subprocess implementation

use crate::errors::{InstallerError, Result};
use crate::process::cancel::CancelSignal;
use crate::process::command::{CommandOutput, CommandSpec};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Executes external commands for the pipeline
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion and capture its combined output.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::exit_code`]. Errors mean the command could not be
    /// started, overran `deadline`, or was cancelled.
    async fn run(
        &self,
        spec: &CommandSpec,
        deadline: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<CommandOutput>;

    /// Locate `name` on the system search path
    fn find_program(&self, name: &str) -> Option<PathBuf>;
}

/// Runs real subprocesses through tokio
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        deadline: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<CommandOutput> {
        let program = spec.program_name();
        if cancel.is_cancelled() {
            return Err(InstallerError::Cancelled { program });
        }

        let start = Instant::now();
        debug!(command = %spec, ?deadline, "spawning command");

        // Dropping the wait future on timeout/cancel kills the child
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InstallerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(InstallerError::Io(io::Error::new(
                io::ErrorKind::Other,
                "child output was not captured",
            )));
        };

        let finished = async {
            let combined = read_interleaved(stdout, stderr).await?;
            let status = child.wait().await?;
            Ok::<_, io::Error>((combined, status))
        };

        let wait = async {
            match deadline {
                Some(limit) => timeout(limit, finished)
                    .await
                    .map_err(|_| InstallerError::Timeout {
                        program: program.clone(),
                        secs: limit.as_secs(),
                    }),
                None => Ok(finished.await),
            }
        };

        let (combined, status) = tokio::select! {
            result = wait => result?.map_err(InstallerError::Io)?,
            _ = cancel.cancelled() => {
                warn!(command = %spec, "command cancelled");
                return Err(InstallerError::Cancelled {
                    program: spec.program_name(),
                });
            }
        };

        let result = CommandOutput {
            exit_code: status.code(),
            output: String::from_utf8_lossy(&combined).into_owned(),
            duration: start.elapsed(),
        };
        debug!(
            command = %spec,
            exit_code = ?result.exit_code,
            duration_ms = result.duration.as_millis() as u64,
            "command finished"
        );
        Ok(result)
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .flat_map(|dir| candidates(&dir, name))
            .find(|candidate| is_executable(candidate))
    }
}

/// Drain both streams into one buffer in the order chunks arrive
async fn read_interleaved(
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
) -> io::Result<Vec<u8>> {
    let mut combined = Vec::new();
    let mut out_buf = [0u8; 8192];
    let mut err_buf = [0u8; 8192];
    let (mut out_open, mut err_open) = (true, true);

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read? {
                0 => out_open = false,
                n => combined.extend_from_slice(&out_buf[..n]),
            },
            read = stderr.read(&mut err_buf), if err_open => match read? {
                0 => err_open = false,
                n => combined.extend_from_slice(&err_buf[..n]),
            },
        }
    }

    Ok(combined)
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    std::iter::once(dir.join(name))
        .chain(
            exts.split(';')
                .filter(|ext| !ext.is_empty())
                .map(|ext| dir.join(format!("{}{}", name, ext))),
        )
        .collect()
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
