//! Auto-Coder installer - CLI entry point

use anyhow::{Context, Result};
use autocoder_installer::{
    cli::{Args, Commands},
    config::InstallerConfig,
    doctor::Doctor,
    logging::{self, LoggingConfig},
    platform::{Os, PlatformProfile},
    process::{cancel_pair, SystemRunner},
    DisplayMode, Installer,
};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = InstallerConfig::load(args.config.clone())
        .context("Failed to load installer configuration")?;
    logging::init_logging(LoggingConfig::resolve(&config.logging, args.verbosity()));
    debug!(command = ?args.command, verbosity = args.verbosity().as_str(), "starting");

    match &args.command {
        Commands::Install { report } => run_install(&args, config, report.clone()).await,
        Commands::Doctor => run_doctor(&config),
        Commands::Config { init: true } => init_config(&args, &config),
        Commands::Config { init: false } => show_config(&args, &config),
    }
}

async fn run_install(args: &Args, config: InstallerConfig, report_path: Option<PathBuf>) -> Result<()> {
    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling installation");
            handle.cancel();
        }
    });

    let installer = Installer::new(config, SystemRunner::new())
        .with_display(DisplayMode::console(args.verbosity().is_quiet()))
        .with_cancel(signal);

    let report = installer.run_install().await;

    if let Some(path) = report_path {
        report
            .save(&path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    std::process::exit(if report.all_succeeded() { 0 } else { 1 });
}

fn run_doctor(config: &InstallerConfig) -> Result<()> {
    let doctor = Doctor::new(config, &Os::detect());
    let checks = doctor.run_diagnostics(&SystemRunner::new());
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn init_config(args: &Args, config: &InstallerConfig) -> Result<()> {
    let path = args
        .config
        .clone()
        .or_else(InstallerConfig::config_path)
        .context("Could not determine home directory for the config file")?;

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    config
        .save(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

fn show_config(args: &Args, config: &InstallerConfig) -> Result<()> {
    let profile = PlatformProfile::current(config);

    println!("\n{}\n", "Auto-Coder Installer Configuration".bold());

    match &args.config {
        Some(path) => println!("Config file: {}", path.display()),
        None => match InstallerConfig::config_path() {
            Some(path) if path.exists() => println!("Config file: {}", path.display()),
            _ => println!("Config file: (built-in defaults)"),
        },
    }
    println!();

    println!("Platform:");
    println!("  OS:             {}", profile.os);
    println!("  Installer:      {}", profile.installer_filename);
    println!("  Download URL:   {}", profile.download_url);
    println!("  Python:         {}", profile.python_version);
    println!("  Conda:          {}", profile.manager_executable.display());
    println!();

    println!("Environment:");
    println!("  Name:           {}", config.environment.name);
    println!("  Package:        {}", config.environment.package);
    println!("  Cluster start:  {}", config.services.cluster.join(" "));
    println!("  Storage start:  {}", config.services.storage.join(" "));
    println!();

    println!("Timeouts (0 = none):");
    println!("  Download:       {}s", config.timeouts.download_secs);
    println!("  Install:        {}s", config.timeouts.install_secs);
    println!("  Commands:       {}s", config.timeouts.command_secs);
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered.dimmed());

    Ok(())
}
