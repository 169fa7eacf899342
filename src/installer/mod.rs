//! Installation orchestration

pub mod orchestrator;
pub mod report;

pub use orchestrator::Installer;
pub use report::{InstallReport, FAILURE_MESSAGE, SUCCESS_MESSAGE};
