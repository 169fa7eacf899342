//! Package installation: `conda run -n <env> pip install -U <package>`

use crate::errors::StepErrorKind;
use crate::steps::{ManagerExecutable, StepContext, StepKind, StepOutcome};

/// Install or upgrade the target package to its latest release
pub async fn install_package(ctx: &StepContext<'_>, manager: &ManagerExecutable) -> StepOutcome {
    let env = &ctx.config.environment;
    let spec = manager.run_in(&env.name, ["pip", "install", "-U", env.package.as_str()]);

    ctx.execute(
        StepKind::Package,
        spec,
        ctx.config.timeouts.command(),
        StepErrorKind::Command,
    )
    .await
}
