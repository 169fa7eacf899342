//! Provisioning: run the Miniconda installer and locate conda afterwards
//!
//! The two platform families install differently. On macOS/Linux the shell
//! installer runs in batch mode and conda is then invoked by name. On
//! Windows the GUI installer runs silently into the user profile, and the
//! resulting `conda.exe` path is discovered here, once, and handed to every
//! later step.

use crate::errors::{InstallerError, StepErrorKind};
use crate::platform::windows_manager_path;
use crate::process::CommandSpec;
use crate::steps::{ManagerExecutable, StepContext, StepKind, StepOutcome};
use std::ffi::OsString;
use std::time::Instant;
use tracing::info;

/// Install Miniconda from the downloaded artifact.
///
/// Returns the manager executable only when the outcome succeeded.
pub async fn provision(ctx: &StepContext<'_>) -> (StepOutcome, Option<ManagerExecutable>) {
    if ctx.profile.os.is_windows() {
        provision_windows(ctx).await
    } else {
        provision_unix(ctx).await
    }
}

async fn provision_unix(ctx: &StepContext<'_>) -> (StepOutcome, Option<ManagerExecutable>) {
    let artifact = ctx.profile.artifact_path(&ctx.config.work_dir());
    let spec = CommandSpec::new("bash").arg(&artifact).arg("-b");

    let outcome = ctx
        .execute(
            StepKind::Provision,
            spec,
            ctx.config.timeouts.install(),
            StepErrorKind::Installer,
        )
        .await;

    let manager = outcome
        .succeeded
        .then(|| ManagerExecutable::new(&ctx.profile.manager_executable));
    (outcome, manager)
}

async fn provision_windows(ctx: &StepContext<'_>) -> (StepOutcome, Option<ManagerExecutable>) {
    let start = Instant::now();
    let work_dir = ctx.config.work_dir();
    let artifact = ctx.profile.artifact_path(&work_dir);

    if !artifact.is_file() {
        let outcome = ctx.fail_early(
            StepKind::Provision,
            InstallerError::ArtifactMissing {
                file: ctx.profile.installer_filename.clone(),
                dir: work_dir,
            },
            StepErrorKind::Installer,
            start,
        );
        return (outcome, None);
    }

    ctx.display.info("Starting Miniconda installation...");
    let target = ctx.config.windows_install_dir();

    let mut install_dir_flag = OsString::from("/D=");
    install_dir_flag.push(&target);

    // `start /wait` blocks until the installer's own process exits
    let spec = CommandSpec::new("cmd")
        .args(["/C", "start", "/wait", ""])
        .arg(&artifact)
        .args(["/InstallationType=JustMe", "/RegisterPython=0", "/S"])
        .arg(install_dir_flag);

    let outcome = ctx
        .execute(
            StepKind::Provision,
            spec,
            ctx.config.timeouts.install(),
            StepErrorKind::Installer,
        )
        .await;
    if !outcome.succeeded {
        return (outcome, None);
    }

    let conda = windows_manager_path(&target);
    if !conda.is_file() {
        let outcome = ctx.fail_early(
            StepKind::Provision,
            InstallerError::ManagerMissing(conda),
            StepErrorKind::Installer,
            start,
        );
        return (outcome, None);
    }

    info!(conda = %conda.display(), "discovered conda executable");
    let outcome = StepOutcome::success(StepKind::Provision, outcome.output, start.elapsed());
    (outcome, Some(ManagerExecutable::new(conda)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstallerConfig;
    use crate::platform::Os;
    use crate::process::RecordingRunner;
    use crate::steps::test_support::Fixture;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Dirs {
        work: TempDir,
        install: TempDir,
    }

    fn setup() -> (Dirs, InstallerConfig) {
        let dirs = Dirs {
            work: TempDir::new().unwrap(),
            install: TempDir::new().unwrap(),
        };
        let mut config = InstallerConfig::default();
        config.artifact.work_dir = dirs.work.path().to_string_lossy().into_owned();
        config.artifact.windows_install_dir = dirs.install.path().to_string_lossy().into_owned();
        (dirs, config)
    }

    #[tokio::test]
    async fn test_unix_runs_batch_installer() {
        let (dirs, config) = setup();
        let fx = Fixture::new(Os::Linux, config, RecordingRunner::new());

        let (outcome, manager) = provision(&fx.ctx()).await;

        assert!(outcome.succeeded);
        assert_eq!(manager, Some(ManagerExecutable::new("conda")));
        let issued = fx.runner.issued();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].program, PathBuf::from("bash"));
        assert_eq!(
            issued[0].args,
            vec![
                OsString::from(dirs.work.path().join("miniconda.sh")),
                OsString::from("-b")
            ]
        );
    }

    #[tokio::test]
    async fn test_unix_installer_failure() {
        let (_dirs, config) = setup();
        let fx = Fixture::new(Os::MacOs, config, RecordingRunner::new().fail_on("bash", 1));

        let (outcome, manager) = provision(&fx.ctx()).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_kind, Some(StepErrorKind::Installer));
        assert!(manager.is_none());
    }

    #[tokio::test]
    async fn test_windows_missing_artifact_fails_fast() {
        let (_dirs, config) = setup();
        let fx = Fixture::new(Os::Windows, config, RecordingRunner::new());

        let (outcome, manager) = provision(&fx.ctx()).await;

        assert!(!outcome.succeeded);
        assert!(manager.is_none());
        assert_eq!(fx.runner.issued_count(), 0);
        assert_eq!(outcome.error_kind, Some(StepErrorKind::Installer));
        assert!(fx.display.mentions("miniconda.exe not found"));
    }

    #[tokio::test]
    async fn test_windows_discovers_conda_path() {
        let (dirs, config) = setup();
        std::fs::write(dirs.work.path().join("miniconda.exe"), b"MZ").unwrap();
        let conda = windows_manager_path(dirs.install.path());
        let runner = RecordingRunner::new().creates_file_on("/InstallationType=JustMe", &conda);
        let fx = Fixture::new(Os::Windows, config, runner);

        let (outcome, manager) = provision(&fx.ctx()).await;

        assert!(outcome.succeeded);
        assert_eq!(manager, Some(ManagerExecutable::new(&conda)));

        let rendered = fx.runner.issued()[0].to_string();
        assert!(rendered.starts_with("cmd /C start /wait \"\""));
        assert!(rendered.contains("/RegisterPython=0"));
        assert!(rendered.contains("/S"));
        assert!(rendered.contains("/D="));
    }

    #[tokio::test]
    async fn test_windows_missing_conda_reports_path() {
        let (dirs, config) = setup();
        std::fs::write(dirs.work.path().join("miniconda.exe"), b"MZ").unwrap();
        let fx = Fixture::new(Os::Windows, config, RecordingRunner::new());

        let (outcome, manager) = provision(&fx.ctx()).await;

        let expected = windows_manager_path(dirs.install.path());
        assert!(!outcome.succeeded);
        assert!(manager.is_none());
        assert!(outcome
            .detail
            .as_deref()
            .unwrap()
            .contains(&expected.display().to_string()));
        assert!(fx.display.mentions("Conda not found at:"));
    }
}
