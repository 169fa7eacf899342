//! Service bring-up: cluster head, then storage
//!
//! Success means the launch command returned zero. Readiness of the
//! started service is not checked.

use crate::errors::StepErrorKind;
use crate::steps::{ManagerExecutable, StepContext, StepKind, StepOutcome};

/// `conda run -n <env> ray start --head`
pub async fn start_cluster(ctx: &StepContext<'_>, manager: &ManagerExecutable) -> StepOutcome {
    start_service(ctx, manager, StepKind::Cluster, &ctx.config.services.cluster).await
}

/// `conda run -n <env> byzerllm storage start`
pub async fn start_storage(ctx: &StepContext<'_>, manager: &ManagerExecutable) -> StepOutcome {
    start_service(ctx, manager, StepKind::Storage, &ctx.config.services.storage).await
}

async fn start_service(
    ctx: &StepContext<'_>,
    manager: &ManagerExecutable,
    step: StepKind,
    command: &[String],
) -> StepOutcome {
    let spec = manager.run_in(&ctx.config.environment.name, command);
    ctx.execute(step, spec, ctx.config.timeouts.command(), StepErrorKind::Command)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallerConfig;
    use crate::platform::Os;
    use crate::process::RecordingRunner;
    use crate::steps::test_support::Fixture;

    #[tokio::test]
    async fn test_start_cluster_head() {
        let fx = Fixture::new(Os::Linux, InstallerConfig::default(), RecordingRunner::new());

        let outcome = start_cluster(&fx.ctx(), &ManagerExecutable::new("conda")).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.step, StepKind::Cluster);
        assert_eq!(
            fx.runner.issued()[0].to_string(),
            "conda run -n auto-coder ray start --head"
        );
    }

    #[tokio::test]
    async fn test_storage_uses_same_manager() {
        let fx = Fixture::new(Os::Windows, InstallerConfig::default(), RecordingRunner::new());
        let manager = ManagerExecutable::new("D:/mc/Scripts/conda.exe");

        let outcome = start_storage(&fx.ctx(), &manager).await;

        assert!(outcome.succeeded);
        let issued = fx.runner.issued();
        assert_eq!(issued[0].program, manager.path());
        assert!(fx.runner.was_issued("run -n auto-coder byzerllm storage start"));
    }

    #[tokio::test]
    async fn test_launch_timeout() {
        let runner = RecordingRunner::new().timeout_on("ray start");
        let fx = Fixture::new(Os::Linux, InstallerConfig::default(), runner);

        let outcome = start_cluster(&fx.ctx(), &ManagerExecutable::new("conda")).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_kind, Some(StepErrorKind::TimedOut));
    }
}
