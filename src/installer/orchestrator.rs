//! Installation pipeline
//!
//! Download → Provision → Environment → Package → Cluster → Storage.
//! Each step runs only if its immediate prerequisite succeeded. A conda
//! already on the search path satisfies Download and Provision without
//! running either.

use crate::config::InstallerConfig;
use crate::display_mode::DisplayMode;
use crate::installer::report::InstallReport;
use crate::platform::{Os, PlatformProfile};
use crate::process::{CancelSignal, CommandRunner};
use crate::steps::{
    acquisition, environment, package, provisioning, services, ManagerExecutable, StepContext,
    StepKind, StepOutcome, MANAGER_NAME,
};
use std::time::Instant;
use tracing::{info, warn};

/// Runs the installation pipeline against a command runner
pub struct Installer<R: CommandRunner> {
    config: InstallerConfig,
    os: Os,
    runner: R,
    display: DisplayMode,
    cancel: CancelSignal,
}

impl<R: CommandRunner> Installer<R> {
    /// Installer for the running OS with console narration
    pub fn new(config: InstallerConfig, runner: R) -> Self {
        Self {
            config,
            os: Os::detect(),
            runner,
            display: DisplayMode::console(false),
            cancel: CancelSignal::never(),
        }
    }

    /// Resolve the platform profile for `os` instead of the running OS
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    pub fn with_display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn display(&self) -> &DisplayMode {
        &self.display
    }

    /// Run every step in order, stopping at the first failure, and narrate
    /// the overall result.
    pub async fn run_install(&self) -> InstallReport {
        let start = Instant::now();
        let profile = PlatformProfile::resolve(&self.os, &self.config);
        let ctx = StepContext {
            profile: &profile,
            config: &self.config,
            runner: &self.runner,
            display: &self.display,
            cancel: &self.cancel,
        };
        let mut report = InstallReport::new(profile.os.to_string());
        info!(platform = %profile.os, "starting installation");

        if let Some(manager) = self.bootstrap_manager(&ctx, &mut report).await {
            self.install_into_environment(&ctx, &manager, &mut report)
                .await;
        }

        report.finish(start.elapsed());
        self.conclude(&report);
        report
    }

    /// Download and Provision, or the pre-installed short-circuit
    async fn bootstrap_manager(
        &self,
        ctx: &StepContext<'_>,
        report: &mut InstallReport,
    ) -> Option<ManagerExecutable> {
        if let Some(existing) = self.runner.find_program(MANAGER_NAME) {
            info!(conda = %existing.display(), "conda already installed");
            self.display
                .info("Conda is already installed. Skipping Miniconda download and install.");
            report.record(StepOutcome::already_satisfied(StepKind::Download));
            report.record(StepOutcome::already_satisfied(StepKind::Provision));
            return Some(ManagerExecutable::new(existing));
        }

        self.display.step("Downloading Miniconda...");
        if !report.record(acquisition::ensure_artifact(ctx).await) {
            self.display
                .error("Miniconda download failed. Aborting installation.");
            return None;
        }

        self.display.step("Installing Miniconda...");
        let (outcome, manager) = provisioning::provision(ctx).await;
        report.record(outcome);
        manager
    }

    async fn install_into_environment(
        &self,
        ctx: &StepContext<'_>,
        manager: &ManagerExecutable,
        report: &mut InstallReport,
    ) {
        let env = &self.config.environment;

        self.display
            .step(&format!("Creating {} environment...", env.name));
        if !report.record(environment::create_environment(ctx, manager).await) {
            return;
        }

        self.display
            .step(&format!("Installing {} package...", env.package));
        if !report.record(package::install_package(ctx, manager).await) {
            return;
        }

        self.display.step("Starting Ray cluster...");
        if !report.record(services::start_cluster(ctx, manager).await) {
            return;
        }

        self.display.step("Installing byzerllm storage...");
        report.record(services::start_storage(ctx, manager).await);
    }

    fn conclude(&self, report: &InstallReport) {
        if report.all_succeeded() {
            info!(duration_ms = report.duration_ms, "installation complete");
            self.display.success(report.summary_message());
        } else {
            match report.first_failure() {
                Some(failed) => warn!(
                    step = %failed.step,
                    kind = ?failed.error_kind,
                    detail = failed.detail.as_deref().unwrap_or(""),
                    "installation failed"
                ),
                None => warn!("installation failed"),
            }
            self.display.error(report.summary_message());
        }
    }
}
