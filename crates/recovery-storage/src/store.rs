use recovery_core::models::completion::CompletionRecords;
use recovery_core::models::form::FormDefinition;
use recovery_core::models::progress::PatientFormProgress;
use recovery_core::models::task::{Protocol, TaskDefinition};

use recovery_core::store_keys;

use crate::error::StorageError;

/// Opaque token identifying one saved revision of a progress document.
pub type Version = String;

/// Every id that becomes part of a key must be a single plain segment.
pub(crate) fn ensure_ids(ids: &[&str]) -> Result<(), StorageError> {
    match ids.iter().find(|id| !store_keys::is_valid_segment(id)) {
        Some(id) => Err(StorageError::InvalidKey {
            key: id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Where protocols, form definitions and patient progress live.
///
/// Implementations parse and shape-check documents at this boundary; the
/// core only ever sees validated types.
pub trait TaskFormStore: Send + Sync {
    fn load_protocol(&self, protocol_id: &str) -> Result<Protocol, StorageError>;

    fn load_protocol_tasks(&self, protocol_id: &str) -> Result<Vec<TaskDefinition>, StorageError> {
        Ok(self.load_protocol(protocol_id)?.tasks)
    }

    fn load_form_definition(&self, form_id: &str) -> Result<FormDefinition, StorageError>;

    /// `None` before the patient's first interaction with the instance.
    fn load_patient_form_progress(
        &self,
        patient_id: &str,
        form_instance_id: &str,
    ) -> Result<Option<(PatientFormProgress, Version)>, StorageError>;

    /// Save `progress` if the stored revision still matches `expected`
    /// (`None` = must not exist yet). Returns the new version, or
    /// [`StorageError::Conflict`] when another writer got there first.
    fn save_patient_form_progress(
        &self,
        progress: &PatientFormProgress,
        expected: Option<&Version>,
    ) -> Result<Version, StorageError>;
}

/// Source of per-task completion facts for the assignment view.
pub trait CompletionRecordSource: Send + Sync {
    /// Records keyed by task id. Empty when the patient has none yet.
    fn get_completion_records(
        &self,
        patient_id: &str,
        protocol_id: &str,
    ) -> Result<CompletionRecords, StorageError>;
}
