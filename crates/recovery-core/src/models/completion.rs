use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::progress::ProgressStatus;

/// Persisted fact about a patient's work on one protocol task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompletionRecord {
    pub task_id: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<jiff::Timestamp>,
}

impl CompletionRecord {
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

/// Completion records for one patient and protocol, keyed by task id.
pub type CompletionRecords = BTreeMap<String, CompletionRecord>;
