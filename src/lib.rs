//! Auto-Coder installer
//!
//! Provisions a local Auto-Coder runtime end to end: fetches Miniconda,
//! installs it, creates the `auto-coder` environment, installs the package
//! and starts the Ray head and byzerllm storage services.
//!
//! # Architecture
//!
//! - **platform**: OS → installer artifact, URL, interpreter version
//! - **steps**: one module per pipeline step, each reporting a `StepOutcome`
//! - **installer**: gated orchestration and the aggregate `InstallReport`
//! - **process**: bounded, cancellable subprocess execution

pub mod errors;
pub use errors::{InstallerError, Result, StepErrorKind};

pub mod cli;
pub mod config;
pub mod logging;

pub mod platform;
pub mod process;
pub mod steps;

pub mod installer;
pub use installer::{InstallReport, Installer};

pub mod doctor;

// Narration for operators
pub mod display_mode;
pub use display_mode::DisplayMode;
