//! Per-step outcome records for operations spanning several stores.
//!
//! A publish, update or delete touches the metadata store, the blob store
//! and the search index in turn. Only the metadata step can fail the whole
//! operation; the others are best effort. The [`SagaReport`] records what
//! happened to each step so callers and tests can see partial failures.

use std::fmt;

use gallery_types::AppId;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    CreateMetadata,
    UpdateMetadata,
    ExportBundle,
    CopyThumbnail,
    IndexSearch,
    DeleteMetadata,
    UnindexSearch,
    DeleteBundle,
    DeleteImage,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateMetadata => "create_metadata",
            Self::UpdateMetadata => "update_metadata",
            Self::ExportBundle => "export_bundle",
            Self::CopyThumbnail => "copy_thumbnail",
            Self::IndexSearch => "index_search",
            Self::DeleteMetadata => "delete_metadata",
            Self::UnindexSearch => "unindex_search",
            Self::DeleteBundle => "delete_bundle",
            Self::DeleteImage => "delete_image",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    /// Nothing to do, e.g. no staged thumbnail.
    Skipped(String),
    /// The step failed; the error was logged and swallowed.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: SagaStep,
    pub outcome: StepOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SagaReport {
    pub app_id: AppId,
    pub steps: Vec<StepRecord>,
}

impl SagaReport {
    pub fn new(app_id: AppId) -> Self {
        Self {
            app_id,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: SagaStep, outcome: StepOutcome) {
        self.steps.push(StepRecord { step, outcome });
    }

    pub fn done(&mut self, step: SagaStep) {
        self.record(step, StepOutcome::Done);
    }

    pub fn skipped(&mut self, step: SagaStep, reason: impl Into<String>) {
        self.record(step, StepOutcome::Skipped(reason.into()));
    }

    pub fn failed(&mut self, step: SagaStep, error: impl fmt::Display) {
        self.record(step, StepOutcome::Failed(error.to_string()));
    }

    /// Outcome of the last record for `step`.
    pub fn outcome(&self, step: SagaStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .rev()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed(_)))
    }

    /// Returns `true` if no step failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn log(&self, operation: &str) {
        let failed = self.failures().count();
        if failed == 0 {
            info!(app_id = %self.app_id, operation, steps = self.steps.len(), "saga complete");
        } else {
            let steps: Vec<String> = self.failures().map(|r| r.step.to_string()).collect();
            warn!(
                app_id = %self.app_id,
                operation,
                failed,
                failed_steps = %steps.join(","),
                "saga completed with failures"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_outcomes_in_order() {
        let mut saga = SagaReport::new(AppId::new());
        saga.done(SagaStep::CreateMetadata);
        saga.skipped(SagaStep::CopyThumbnail, "no staged image");
        saga.failed(SagaStep::IndexSearch, "index offline");

        assert_eq!(saga.steps.len(), 3);
        assert_eq!(saga.outcome(SagaStep::CreateMetadata), Some(&StepOutcome::Done));
        assert!(matches!(
            saga.outcome(SagaStep::CopyThumbnail),
            Some(StepOutcome::Skipped(_))
        ));
        assert_eq!(saga.outcome(SagaStep::DeleteBundle), None);
        assert!(!saga.is_clean());
        assert_eq!(saga.failures().count(), 1);
    }

    #[test]
    fn step_names() {
        assert_eq!(SagaStep::ExportBundle.to_string(), "export_bundle");
        assert_eq!(SagaStep::DeleteImage.to_string(), "delete_image");
    }
}
