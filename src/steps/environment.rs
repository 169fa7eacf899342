//! Environment creation: `conda create --name <env> python=<ver> -y`

use crate::errors::StepErrorKind;
use crate::steps::{ManagerExecutable, StepContext, StepKind, StepOutcome};

/// Create the named environment pinned to the platform's interpreter version.
///
/// An environment that already exists is left to conda to handle.
pub async fn create_environment(ctx: &StepContext<'_>, manager: &ManagerExecutable) -> StepOutcome {
    let env = &ctx.config.environment.name;
    let python = format!("python={}", ctx.profile.python_version);
    let spec = manager.command(["create", "--name", env.as_str(), python.as_str(), "-y"]);

    ctx.execute(
        StepKind::Environment,
        spec,
        ctx.config.timeouts.command(),
        StepErrorKind::Command,
    )
    .await
}
