use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::schedule::FrequencyRule;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaskKind {
    Message,
    Form,
    Exercise,
    Video,
}

/// One scheduled unit of protocol content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskDefinition {
    pub id: String,
    pub kind: TaskKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Counts toward completion accounting; has no effect on scheduling.
    #[serde(default)]
    pub required: bool,
    pub schedule: FrequencyRule,
    /// Present only for [`TaskKind::Form`] tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_ref: Option<String>,
    /// Set once a provider edits the task after it was authored.
    #[serde(default)]
    pub adjusted_from_original: bool,
}

/// A recovery protocol as persisted: tasks in authoring order plus the
/// inclusive day bounds of its timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub timeline_start: i32,
    pub timeline_end: i32,
    pub tasks: Vec<TaskDefinition>,
}

impl TaskDefinition {
    /// Shape check for a single task, independent of its protocol.
    pub fn check(&self) -> Result<(), CoreError> {
        self.schedule
            .check()
            .map_err(|e| CoreError::InvalidRule(format!("task '{}': {e}", self.id)))?;
        if self.kind == TaskKind::Form && self.form_ref.is_none() {
            return Err(CoreError::InvalidRule(format!(
                "task '{}' is a form task without a form_ref",
                self.id
            )));
        }
        Ok(())
    }
}

impl Protocol {
    /// Validate a protocol loaded from outside the process.
    pub fn check(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidProtocol {
            protocol_id: self.id.clone(),
            reason,
        };

        if self.timeline_start > self.timeline_end {
            return Err(invalid(format!(
                "timeline_start {} is after timeline_end {}",
                self.timeline_start, self.timeline_end
            )));
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(invalid(format!("duplicate task id '{}'", task.id)));
            }
            task.check().map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}
