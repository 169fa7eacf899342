//! Step identifiers and per-step outcomes

use crate::errors::StepErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The six pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Download,
    Provision,
    Environment,
    Package,
    Cluster,
    Storage,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::Download,
        StepKind::Provision,
        StepKind::Environment,
        StepKind::Package,
        StepKind::Cluster,
        StepKind::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Download => "download",
            StepKind::Provision => "provision",
            StepKind::Environment => "environment",
            StepKind::Package => "package",
            StepKind::Cluster => "cluster",
            StepKind::Storage => "storage",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepKind,

    pub succeeded: bool,

    /// Combined stdout/stderr of the command the step ran, if any
    pub output: String,

    /// Failure category when `succeeded` is false
    pub error_kind: Option<StepErrorKind>,

    /// Human-readable failure detail
    pub detail: Option<String>,

    pub duration_ms: u64,
}

impl StepOutcome {
    pub fn success(step: StepKind, output: String, duration: Duration) -> Self {
        Self {
            step,
            succeeded: true,
            output,
            error_kind: None,
            detail: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn failure(
        step: StepKind,
        kind: StepErrorKind,
        detail: String,
        output: String,
        duration: Duration,
    ) -> Self {
        Self {
            step,
            succeeded: false,
            output,
            error_kind: Some(kind),
            detail: Some(detail),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Manager already installed; nothing ran
    pub fn already_satisfied(step: StepKind) -> Self {
        Self::success(step, String::new(), Duration::ZERO)
    }

    /// Never attempted because a prerequisite failed
    pub fn skipped(step: StepKind) -> Self {
        Self {
            step,
            succeeded: false,
            output: String::new(),
            error_kind: Some(StepErrorKind::Skipped),
            detail: None,
            duration_ms: 0,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.error_kind == Some(StepErrorKind::Skipped)
    }
}
