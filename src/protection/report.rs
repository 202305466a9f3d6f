//! Per-run record of what each pipeline stage did.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// States a protection run passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Decoded,
    Watermarked,
    MetadataTagged,
    Noised,
    Encoded,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decoded => "decoded",
            Self::Watermarked => "watermarked",
            Self::MetadataTagged => "metadata_tagged",
            Self::Noised => "noised",
            Self::Encoded => "encoded",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened in one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Applied { detail: Option<String> },
    /// Not requested (disabled or empty)
    Skipped { reason: String },
    /// Failed; the stage passed its input through unchanged
    FellBack { error: String },
}

impl StageOutcome {
    pub fn applied() -> Self {
        Self::Applied { detail: None }
    }

    pub fn applied_with(detail: impl Into<String>) -> Self {
        Self::Applied {
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn fell_back(error: impl fmt::Display) -> Self {
        Self::FellBack {
            error: error.to_string(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::FellBack { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub state: PipelineState,
    #[serde(flatten)]
    pub outcome: StageOutcome,
    pub duration_ms: f64,
}

/// Stage records of one run, ordered by pipeline state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtectionReport {
    pub stages: Vec<StageRecord>,
    pub total_ms: f64,
}

impl ProtectionReport {
    pub fn record(&mut self, state: PipelineState, outcome: StageOutcome, elapsed: Duration) {
        self.stages.push(StageRecord {
            state,
            outcome,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
        });
        self.stages.sort_by_key(|s| s.state);
    }

    pub fn outcome(&self, state: PipelineState) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|s| s.state == state)
            .map(|s| &s.outcome)
    }

    /// States whose stage failed and fell back.
    pub fn fallbacks(&self) -> Vec<PipelineState> {
        self.stages
            .iter()
            .filter(|s| s.outcome.is_fallback())
            .map(|s| s.state)
            .collect()
    }
}
