//! Doctor command for prerequisite diagnostics
//!
//! Checks what the install pipeline will need before running it.

use crate::config::InstallerConfig;
use crate::platform::{Os, PlatformProfile};
use crate::process::CommandRunner;
use crate::steps::MANAGER_NAME;
use colored::Colorize;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Minimum free space for Miniconda plus the environment
const MIN_DISK_GB: u64 = 3;
const LOW_DISK_GB: u64 = 10;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    profile: PlatformProfile,
    work_dir: PathBuf,
}

impl Doctor {
    pub fn new(config: &InstallerConfig, os: &Os) -> Self {
        Self {
            profile: PlatformProfile::resolve(os, config),
            work_dir: config.work_dir(),
        }
    }

    /// Run all health checks
    pub fn run_diagnostics(&self, runner: &dyn CommandRunner) -> Vec<HealthCheck> {
        let manager_found = runner.find_program(MANAGER_NAME).is_some();

        vec![
            self.check_platform(),
            self.check_manager(manager_found),
            self.check_fetch_tool(runner, manager_found),
            self.check_artifact(),
            self.check_disk_space(),
            self.check_permissions(),
        ]
    }

    fn check_platform(&self) -> HealthCheck {
        let status = if self.profile.os.is_supported() {
            HealthStatus::Pass
        } else {
            HealthStatus::Fail(format!("No Miniconda installer for {}", self.profile.os))
        };
        HealthCheck::new("Platform", status)
    }

    fn check_manager(&self, found: bool) -> HealthCheck {
        let status = if found {
            HealthStatus::Pass
        } else {
            HealthStatus::Warn("conda not on PATH; Miniconda will be installed".to_string())
        };
        HealthCheck::new("Conda", status)
    }

    fn check_fetch_tool(&self, runner: &dyn CommandRunner, manager_found: bool) -> HealthCheck {
        let tool = if self.profile.os.is_windows() { "curl" } else { "wget" };

        let status = if runner.find_program(tool).is_some() {
            HealthStatus::Pass
        } else if manager_found || self.profile_artifact().exists() {
            HealthStatus::Warn(format!("{} not found (not needed for this run)", tool))
        } else {
            HealthStatus::Fail(format!("{} not found; cannot download Miniconda", tool))
        };
        HealthCheck::new("Download Tool", status)
    }

    fn check_artifact(&self) -> HealthCheck {
        let status = if !self.profile.os.is_supported() || self.profile_artifact().exists() {
            HealthStatus::Pass
        } else {
            HealthStatus::Warn(format!(
                "{} not cached; it will be downloaded",
                self.profile.installer_filename
            ))
        };
        HealthCheck::new("Installer Cache", status)
    }

    fn check_disk_space(&self) -> HealthCheck {
        let disks = Disks::new_with_refreshed_list();
        let work_dir = self
            .work_dir
            .canonicalize()
            .unwrap_or_else(|_| self.work_dir.clone());

        // Deepest mount point containing the work dir
        let disk = disks
            .list()
            .iter()
            .filter(|disk| work_dir.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count());

        let Some(disk) = disk else {
            return HealthCheck::new(
                "Disk Space",
                HealthStatus::Warn("Could not determine disk space".to_string()),
            );
        };

        let available_gb = disk.available_space() / (1024 * 1024 * 1024);
        let status = if available_gb < MIN_DISK_GB {
            HealthStatus::Fail(format!(
                "Less than {}GB available ({} GB)",
                MIN_DISK_GB, available_gb
            ))
        } else if available_gb < LOW_DISK_GB {
            HealthStatus::Warn(format!("Low disk space ({} GB available)", available_gb))
        } else {
            HealthStatus::Pass
        };
        HealthCheck::new("Disk Space", status)
    }

    fn check_permissions(&self) -> HealthCheck {
        check_writable(&self.work_dir)
    }

    fn profile_artifact(&self) -> PathBuf {
        self.profile.artifact_path(&self.work_dir)
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\nAuto-Coder Installer Diagnostics\n");
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };
            println!("{:<20} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks
            .iter()
            .any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

fn check_writable(dir: &Path) -> HealthCheck {
    if !dir.is_dir() {
        return HealthCheck::new(
            "Permissions",
            HealthStatus::Fail(format!("Work directory {} does not exist", dir.display())),
        );
    }

    let probe = dir.join(".autocoder_installer_probe");
    match std::fs::write(&probe, "probe") {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            HealthCheck::new("Permissions", HealthStatus::Pass)
        }
        Err(_) => HealthCheck::new(
            "Permissions",
            HealthStatus::Fail("No write permission in work directory".to_string()),
        ),
    }
}
