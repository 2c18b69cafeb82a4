use std::path::{Path, PathBuf};
use std::sync::Mutex;

use recovery_core::models::completion::{CompletionRecord, CompletionRecords};
use recovery_core::models::form::FormDefinition;
use recovery_core::models::progress::PatientFormProgress;
use recovery_core::models::task::Protocol;
use recovery_core::store_keys;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::objects;
use crate::state;
use crate::store::{ensure_ids, CompletionRecordSource, TaskFormStore, Version};

/// JSON documents under a data directory, laid out by `store_keys`.
///
/// Conditional writes are serialized through an in-process lock; two
/// processes sharing a directory are not coordinated.
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no bad state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn save_protocol(&self, protocol: &Protocol) -> Result<(), StorageError> {
        ensure_ids(&[protocol.id.as_str()])?;
        let key = store_keys::protocol(&protocol.id);
        protocol
            .check()
            .map_err(|source| StorageError::InvalidDocument { key: key.clone(), source })?;
        let _guard = self.lock();
        state::save_state(&self.root, &key, protocol)?;
        info!(key = %key, tasks = protocol.tasks.len(), "protocol saved");
        Ok(())
    }

    pub fn save_form_definition(&self, form: &FormDefinition) -> Result<(), StorageError> {
        ensure_ids(&[form.id.as_str()])?;
        let key = store_keys::form(&form.id);
        form.check()
            .map_err(|source| StorageError::InvalidDocument { key: key.clone(), source })?;
        let _guard = self.lock();
        state::save_state(&self.root, &key, form)?;
        info!(key = %key, "form definition saved");
        Ok(())
    }

    /// Ids of every stored form definition.
    pub fn list_form_ids(&self) -> Result<Vec<String>, StorageError> {
        list_ids(&self.root, store_keys::FORMS_PREFIX)
    }

    /// Ids of every stored protocol.
    pub fn list_protocol_ids(&self) -> Result<Vec<String>, StorageError> {
        list_ids(&self.root, store_keys::PROTOCOLS_PREFIX)
    }

    /// Insert or replace the completion record for one task.
    pub fn record_completion(
        &self,
        patient_id: &str,
        protocol_id: &str,
        record: CompletionRecord,
    ) -> Result<(), StorageError> {
        ensure_ids(&[patient_id, protocol_id])?;
        let key = store_keys::completion_records(patient_id, protocol_id);
        let _guard = self.lock();
        let mut records: CompletionRecords = state::load_state_opt(&self.root, &key)?
            .map(|(records, _)| records)
            .unwrap_or_default();
        records.insert(record.task_id.clone(), record);
        state::save_state(&self.root, &key, &records)?;
        Ok(())
    }
}

fn list_ids(root: &Path, prefix: &str) -> Result<Vec<String>, StorageError> {
    Ok(objects::list_objects(root, prefix)?
        .into_iter()
        .filter_map(|key| {
            key.strip_prefix(prefix)
                .and_then(|name| name.strip_suffix(".json"))
                .map(str::to_string)
        })
        .collect())
}

impl TaskFormStore for FileStore {
    fn load_protocol(&self, protocol_id: &str) -> Result<Protocol, StorageError> {
        ensure_ids(&[protocol_id])?;
        let key = store_keys::protocol(protocol_id);
        let (protocol, _): (Protocol, _) = state::load_state(&self.root, &key)?;
        protocol
            .check()
            .map_err(|source| StorageError::InvalidDocument { key, source })?;
        Ok(protocol)
    }

    fn load_form_definition(&self, form_id: &str) -> Result<FormDefinition, StorageError> {
        ensure_ids(&[form_id])?;
        let key = store_keys::form(form_id);
        let (form, _): (FormDefinition, _) = state::load_state(&self.root, &key)?;
        form.check()
            .map_err(|source| StorageError::InvalidDocument { key, source })?;
        Ok(form)
    }

    fn load_patient_form_progress(
        &self,
        patient_id: &str,
        form_instance_id: &str,
    ) -> Result<Option<(PatientFormProgress, Version)>, StorageError> {
        ensure_ids(&[patient_id, form_instance_id])?;
        let key = store_keys::patient_form_progress(patient_id, form_instance_id);
        state::load_state_opt(&self.root, &key)
    }

    fn save_patient_form_progress(
        &self,
        progress: &PatientFormProgress,
        expected: Option<&Version>,
    ) -> Result<Version, StorageError> {
        ensure_ids(&[progress.patient_id.as_str(), progress.form_instance_id.as_str()])?;
        let key =
            store_keys::patient_form_progress(&progress.patient_id, &progress.form_instance_id);
        let _guard = self.lock();
        match state::save_state_if_match(&self.root, &key, progress, expected.map(String::as_str)) {
            Ok(version) => {
                info!(key = %key, status = ?progress.status, "progress saved");
                Ok(version)
            }
            Err(e @ StorageError::Conflict { .. }) => {
                warn!(key = %key, "progress save rejected: stale version");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

impl CompletionRecordSource for FileStore {
    fn get_completion_records(
        &self,
        patient_id: &str,
        protocol_id: &str,
    ) -> Result<CompletionRecords, StorageError> {
        ensure_ids(&[patient_id, protocol_id])?;
        let key = store_keys::completion_records(patient_id, protocol_id);
        Ok(state::load_state_opt(&self.root, &key)?
            .map(|(records, _)| records)
            .unwrap_or_default())
    }
}
