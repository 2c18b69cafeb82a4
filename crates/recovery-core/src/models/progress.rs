use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle of a patient's pass through a form. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProgressStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordedResponse {
    pub question_id: String,
    pub value: serde_json::Value,
    pub answered_at: jiff::Timestamp,
}

/// Per (patient, form instance) record of answers. This is the audit trail:
/// it is never deleted, only marked completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientFormProgress {
    pub patient_id: String,
    pub form_instance_id: String,
    pub form_id: String,
    /// `None` once the flow has been walked past its last step.
    pub current_step_id: Option<String>,
    /// Answer order; a re-answer replaces the earlier entry and moves last.
    pub responses: Vec<RecordedResponse>,
    pub completed_step_ids: BTreeSet<String>,
    pub status: ProgressStatus,
    pub started_at: Option<jiff::Timestamp>,
    pub completed_at: Option<jiff::Timestamp>,
}

impl PatientFormProgress {
    pub fn response(&self, question_id: &str) -> Option<&serde_json::Value> {
        self.responses
            .iter()
            .find(|r| r.question_id == question_id)
            .map(|r| &r.value)
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}
