//! End-to-end pipeline scenarios against a scripted runner

use autocoder_installer::{
    config::InstallerConfig,
    errors::StepErrorKind,
    installer::{FAILURE_MESSAGE, SUCCESS_MESSAGE},
    platform::{windows_manager_path, Os},
    process::RecordingRunner,
    steps::StepKind,
    DisplayMode, Installer,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn installer(dir: &TempDir, os: Os, runner: RecordingRunner) -> Installer<RecordingRunner> {
    let mut config = InstallerConfig::default();
    config.artifact.work_dir = dir.path().to_string_lossy().into_owned();
    config.artifact.windows_install_dir = install_dir(dir).to_string_lossy().into_owned();
    Installer::new(config, runner)
        .with_os(os)
        .with_display(DisplayMode::capture())
}

fn install_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("Miniconda3")
}

fn downstream() -> [StepKind; 5] {
    [
        StepKind::Provision,
        StepKind::Environment,
        StepKind::Package,
        StepKind::Cluster,
        StepKind::Storage,
    ]
}

#[tokio::test]
async fn preinstalled_conda_skips_download_and_install() {
    let dir = TempDir::new().unwrap();
    let runner = RecordingRunner::new().with_program_on_path("conda", "/opt/conda/bin/conda");
    let installer = installer(&dir, Os::Linux, runner);

    let report = installer.run_install().await;

    assert!(report.succeeded(StepKind::Download));
    assert!(report.succeeded(StepKind::Provision));
    assert!(!installer.runner().was_issued("wget"));
    assert!(!installer.runner().was_issued("bash"));
    assert!(installer
        .runner()
        .issued()
        .iter()
        .all(|spec| spec.program == PathBuf::from("/opt/conda/bin/conda")));
    assert!(installer.display().mentions("Conda is already installed."));
    assert_eq!(report.summary_message(), SUCCESS_MESSAGE);
}

#[tokio::test]
async fn cached_installer_goes_straight_to_provisioning() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("miniconda.sh"), b"#!/bin/bash").unwrap();
    let installer = installer(&dir, Os::Linux, RecordingRunner::new());

    let report = installer.run_install().await;

    assert!(report.succeeded(StepKind::Download));
    let issued = installer.runner().issued();
    assert_eq!(issued[0].program, PathBuf::from("bash"));
    assert!(!installer.runner().was_issued("wget"));
    assert!(report.all_succeeded());
}

#[tokio::test]
async fn failed_download_aborts_everything() {
    let dir = TempDir::new().unwrap();
    let runner = RecordingRunner::new().fail_on("wget", 4);
    let installer = installer(&dir, Os::Linux, runner);

    let report = installer.run_install().await;

    assert!(!report.succeeded(StepKind::Download));
    assert_eq!(
        report.outcome(StepKind::Download).unwrap().error_kind,
        Some(StepErrorKind::Transfer)
    );
    for step in downstream() {
        assert!(!report.succeeded(step), "{} should not succeed", step);
        assert!(report.outcome(step).unwrap().was_skipped());
    }
    assert_eq!(installer.runner().issued_count(), 1);
    assert!(installer
        .display()
        .mentions("Miniconda download failed. Aborting installation."));
    assert!(installer.display().mentions(FAILURE_MESSAGE));
    assert_eq!(report.summary_message(), FAILURE_MESSAGE);
}

#[tokio::test]
async fn unsupported_platform_fails_at_download() {
    let dir = TempDir::new().unwrap();
    let installer = installer(&dir, Os::from_id("netbsd"), RecordingRunner::new());

    let report = installer.run_install().await;

    let download = report.outcome(StepKind::Download).unwrap();
    assert!(!download.succeeded);
    assert_eq!(download.error_kind, Some(StepErrorKind::UnsupportedPlatform));
    assert_eq!(installer.runner().issued_count(), 0);
    assert_eq!(report.summary_message(), FAILURE_MESSAGE);
}

#[tokio::test]
async fn windows_missing_conda_after_install() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("miniconda.exe"), b"MZ").unwrap();
    let installer = installer(&dir, Os::Windows, RecordingRunner::new());

    let report = installer.run_install().await;

    let expected = windows_manager_path(&install_dir(&dir));
    let provision = report.outcome(StepKind::Provision).unwrap();
    assert!(!provision.succeeded);
    assert!(installer.runner().was_issued("/InstallationType=JustMe"));
    assert!(installer
        .display()
        .mentions(&format!("Conda not found at: {}", expected.display())));
    assert!(!installer.runner().was_issued("create"));
    assert!(report.outcome(StepKind::Environment).unwrap().was_skipped());
}

#[tokio::test]
async fn windows_threads_discovered_conda_to_every_step() {
    let dir = TempDir::new().unwrap();
    let conda = windows_manager_path(&install_dir(&dir));
    let runner = RecordingRunner::new()
        .creates_file_on("miniconda.exe https://", dir.path().join("miniconda.exe"))
        .creates_file_on("/InstallationType=JustMe", &conda);
    let installer = installer(&dir, Os::Windows, runner);

    let report = installer.run_install().await;

    assert!(report.all_succeeded(), "{:#?}", report.outcomes);
    let issued = installer.runner().issued();
    assert_eq!(issued.len(), 6);
    assert_eq!(issued[0].program, PathBuf::from("curl"));
    assert_eq!(issued[1].program, PathBuf::from("cmd"));
    for spec in &issued[2..] {
        assert_eq!(spec.program, conda);
    }
    assert!(installer.runner().was_issued("python=3.11.9"));
}

#[tokio::test]
async fn package_failure_leaves_services_unstarted() {
    let dir = TempDir::new().unwrap();
    let runner = RecordingRunner::new()
        .with_program_on_path("conda", "conda")
        .fail_on("pip install", 1);
    let installer = installer(&dir, Os::MacOs, runner);

    let report = installer.run_install().await;

    assert!(report.succeeded(StepKind::Environment));
    assert!(!report.succeeded(StepKind::Package));
    assert!(!installer.runner().was_issued("ray start"));
    assert!(!installer.runner().was_issued("byzerllm"));
    assert_eq!(
        report.first_failure().map(|o| o.step),
        Some(StepKind::Package)
    );
}

#[tokio::test]
async fn storage_timeout_is_reported() {
    let dir = TempDir::new().unwrap();
    let runner = RecordingRunner::new()
        .with_program_on_path("conda", "conda")
        .timeout_on("byzerllm storage start");
    let installer = installer(&dir, Os::Linux, runner);

    let report = installer.run_install().await;

    assert!(report.succeeded(StepKind::Cluster));
    assert_eq!(
        report.outcome(StepKind::Storage).unwrap().error_kind,
        Some(StepErrorKind::TimedOut)
    );
    assert!(!report.all_succeeded());
}
