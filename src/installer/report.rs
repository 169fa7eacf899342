//! Aggregate result of one installation run

use crate::errors::{InstallerError, Result};
use crate::steps::{StepKind, StepOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const SUCCESS_MESSAGE: &str = "Auto-Coder installation completed successfully!";
pub const FAILURE_MESSAGE: &str = "Auto-Coder installation encountered errors.";

/// Outcomes of all six steps plus run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub started_at: DateTime<Utc>,
    pub platform: String,
    pub outcomes: Vec<StepOutcome>,
    pub duration_ms: u64,
}

impl InstallReport {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            platform: platform.into(),
            outcomes: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Store an outcome and return whether it succeeded
    pub fn record(&mut self, outcome: StepOutcome) -> bool {
        let succeeded = outcome.succeeded;
        self.outcomes.retain(|existing| existing.step != outcome.step);
        self.outcomes.push(outcome);
        succeeded
    }

    /// Mark every step without an outcome as skipped and stamp the duration
    pub fn finish(&mut self, elapsed: Duration) {
        for step in StepKind::ALL {
            if self.outcome(step).is_none() {
                self.outcomes.push(StepOutcome::skipped(step));
            }
        }
        self.outcomes
            .sort_by_key(|o| StepKind::ALL.iter().position(|s| *s == o.step));
        self.duration_ms = elapsed.as_millis() as u64;
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }

    /// False for failed, skipped, and never-recorded steps
    pub fn succeeded(&self, step: StepKind) -> bool {
        self.outcome(step).map(|o| o.succeeded).unwrap_or(false)
    }

    /// True only when all six steps succeeded
    pub fn all_succeeded(&self) -> bool {
        StepKind::ALL.iter().all(|step| self.succeeded(*step))
    }

    /// First step that failed outright (not skipped)
    pub fn first_failure(&self) -> Option<&StepOutcome> {
        StepKind::ALL
            .iter()
            .filter_map(|step| self.outcome(*step))
            .find(|o| !o.succeeded && !o.was_skipped())
    }

    pub fn summary_message(&self) -> &'static str {
        if self.all_succeeded() {
            SUCCESS_MESSAGE
        } else {
            FAILURE_MESSAGE
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self
            .to_json()
            .map_err(|e| InstallerError::Config(format!("Failed to serialize report: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
