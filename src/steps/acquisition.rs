//! Acquisition: make sure the Miniconda installer is on disk

use crate::errors::{InstallerError, StepErrorKind};
use crate::process::CommandSpec;
use crate::steps::{StepContext, StepKind, StepOutcome};
use std::time::Instant;
use tracing::{info, warn};

/// Download the installer unless it is already cached in the work dir
pub async fn ensure_artifact(ctx: &StepContext<'_>) -> StepOutcome {
    let start = Instant::now();
    let profile = ctx.profile;

    if !profile.os.is_supported() || profile.download_url.is_empty() {
        return ctx.fail_early(
            StepKind::Download,
            InstallerError::UnsupportedPlatform(profile.os.to_string()),
            StepErrorKind::Transfer,
            start,
        );
    }

    let artifact = profile.artifact_path(&ctx.config.work_dir());
    if artifact.exists() {
        info!(artifact = %artifact.display(), "installer already cached");
        ctx.display.info(&format!(
            "File {} already exists. Skipping download.",
            profile.installer_filename
        ));
        return StepOutcome::success(StepKind::Download, String::new(), start.elapsed());
    }

    let spec = if profile.os.is_windows() {
        CommandSpec::new("curl")
            .arg("-o")
            .arg(&artifact)
            .arg(&profile.download_url)
    } else {
        CommandSpec::new("wget")
            .arg("-O")
            .arg(&artifact)
            .arg(&profile.download_url)
    };

    let outcome = ctx
        .execute(
            StepKind::Download,
            spec,
            ctx.config.timeouts.download(),
            StepErrorKind::Transfer,
        )
        .await;

    // A partial download would otherwise be taken as cached next run
    if !outcome.succeeded && artifact.exists() {
        match std::fs::remove_file(&artifact) {
            Ok(()) => info!(artifact = %artifact.display(), "removed partial download"),
            Err(e) => warn!(
                artifact = %artifact.display(),
                error = %e,
                "could not remove partial download"
            ),
        }
    }

    outcome
}
