//! Pipeline steps
//!
//! Each step attempts its work exactly once and reports a [`StepOutcome`].
//! Steps after provisioning take the [`ManagerExecutable`] explicitly; it is
//! never read from process state.

pub mod acquisition;
pub mod environment;
pub mod package;
pub mod provisioning;
pub mod services;
pub mod types;

pub use types::{StepKind, StepOutcome};

use crate::config::InstallerConfig;
use crate::display_mode::DisplayMode;
use crate::errors::{InstallerError, StepErrorKind};
use crate::platform::PlatformProfile;
use crate::process::{CancelSignal, CommandRunner, CommandSpec};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Name of the environment manager on the search path
pub const MANAGER_NAME: &str = "conda";

/// The conda executable every post-provisioning step invokes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerExecutable(PathBuf);

impl ManagerExecutable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// `conda <args...>`
    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        CommandSpec::new(&self.0).args(args)
    }

    /// `conda run -n <env> <args...>`
    pub fn run_in<I, S>(&self, env: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        CommandSpec::new(&self.0).args(["run", "-n", env]).args(args)
    }
}

/// What every step needs besides the manager
pub struct StepContext<'a> {
    pub profile: &'a PlatformProfile,
    pub config: &'a InstallerConfig,
    pub runner: &'a dyn CommandRunner,
    pub display: &'a DisplayMode,
    pub cancel: &'a CancelSignal,
}

impl<'a> StepContext<'a> {
    /// Run one command for `step`, echo its output, and fold the result into
    /// an outcome. A non-zero exit counts as `failure_kind`.
    pub async fn execute(
        &self,
        step: StepKind,
        spec: CommandSpec,
        deadline: Option<Duration>,
        failure_kind: StepErrorKind,
    ) -> StepOutcome {
        let start = Instant::now();
        debug!(%step, command = %spec, "running step command");

        match self.runner.run(&spec, deadline, self.cancel).await {
            Ok(out) => {
                self.display.output(&out.output);
                if out.success() {
                    StepOutcome::success(step, out.output, start.elapsed())
                } else {
                    let error = InstallerError::CommandFailed {
                        command: spec.to_string(),
                        code: out.exit_code,
                    };
                    let detail = error.to_string();
                    warn!(%step, %detail, "step command failed");
                    StepOutcome::failure(
                        step,
                        error.kind(failure_kind),
                        detail,
                        out.output,
                        start.elapsed(),
                    )
                }
            }
            Err(e) => {
                let detail = e.to_string();
                warn!(%step, error = %detail, "step command did not complete");
                self.display.error(&detail);
                StepOutcome::failure(
                    step,
                    e.kind(failure_kind),
                    detail,
                    String::new(),
                    start.elapsed(),
                )
            }
        }
    }

    /// Record a failure detected by the step itself rather than by a
    /// command it ran
    pub fn fail_early(
        &self,
        step: StepKind,
        error: InstallerError,
        failure_kind: StepErrorKind,
        start: Instant,
    ) -> StepOutcome {
        let detail = error.to_string();
        warn!(%step, %detail, "step failed");
        self.display.error(&detail);
        StepOutcome::failure(
            step,
            error.kind(failure_kind),
            detail,
            String::new(),
            start.elapsed(),
        )
    }
}
