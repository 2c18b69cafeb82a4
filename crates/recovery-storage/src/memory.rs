use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use recovery_core::models::completion::{CompletionRecord, CompletionRecords};
use recovery_core::models::form::FormDefinition;
use recovery_core::models::progress::PatientFormProgress;
use recovery_core::models::task::Protocol;
use recovery_core::store_keys;

use crate::error::StorageError;
use crate::store::{CompletionRecordSource, TaskFormStore, Version};

#[derive(Default)]
struct Documents {
    protocols: HashMap<String, Protocol>,
    forms: HashMap<String, FormDefinition>,
    progress: HashMap<String, (PatientFormProgress, u64)>,
    completions: HashMap<String, CompletionRecords>,
}

/// Process-local store. Versions are revision counters.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> MutexGuard<'_, Documents> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_protocol(&self, protocol: Protocol) -> Result<(), StorageError> {
        protocol.check().map_err(|source| StorageError::InvalidDocument {
            key: store_keys::protocol(&protocol.id),
            source,
        })?;
        self.docs().protocols.insert(protocol.id.clone(), protocol);
        Ok(())
    }

    pub fn insert_form_definition(&self, form: FormDefinition) -> Result<(), StorageError> {
        form.check().map_err(|source| StorageError::InvalidDocument {
            key: store_keys::form(&form.id),
            source,
        })?;
        self.docs().forms.insert(form.id.clone(), form);
        Ok(())
    }

    pub fn record_completion(&self, patient_id: &str, protocol_id: &str, record: CompletionRecord) {
        self.docs()
            .completions
            .entry(store_keys::completion_records(patient_id, protocol_id))
            .or_default()
            .insert(record.task_id.clone(), record);
    }
}

impl TaskFormStore for MemoryStore {
    fn load_protocol(&self, protocol_id: &str) -> Result<Protocol, StorageError> {
        self.docs()
            .protocols
            .get(protocol_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: store_keys::protocol(protocol_id),
            })
    }

    fn load_form_definition(&self, form_id: &str) -> Result<FormDefinition, StorageError> {
        self.docs()
            .forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: store_keys::form(form_id),
            })
    }

    fn load_patient_form_progress(
        &self,
        patient_id: &str,
        form_instance_id: &str,
    ) -> Result<Option<(PatientFormProgress, Version)>, StorageError> {
        let key = store_keys::patient_form_progress(patient_id, form_instance_id);
        Ok(self
            .docs()
            .progress
            .get(&key)
            .map(|(progress, revision)| (progress.clone(), revision.to_string())))
    }

    fn save_patient_form_progress(
        &self,
        progress: &PatientFormProgress,
        expected: Option<&Version>,
    ) -> Result<Version, StorageError> {
        let key =
            store_keys::patient_form_progress(&progress.patient_id, &progress.form_instance_id);
        let mut docs = self.docs();

        let current = docs.progress.get(&key).map(|(_, revision)| revision.to_string());
        if current.as_ref() != expected {
            tracing::warn!(key = %key, "progress save rejected: stale version");
            return Err(StorageError::Conflict { key });
        }

        let revision = docs.progress.get(&key).map_or(1, |(_, r)| r + 1);
        docs.progress.insert(key, (progress.clone(), revision));
        Ok(revision.to_string())
    }
}

impl CompletionRecordSource for MemoryStore {
    fn get_completion_records(
        &self,
        patient_id: &str,
        protocol_id: &str,
    ) -> Result<CompletionRecords, StorageError> {
        Ok(self
            .docs()
            .completions
            .get(&store_keys::completion_records(patient_id, protocol_id))
            .cloned()
            .unwrap_or_default())
    }
}
