//! One chat turn against the store, with reload-and-retry on stale writes.

use recovery_core::models::progress::PatientFormProgress;
use recovery_forms::error::FormError;
use recovery_forms::{FormSession, Turn};
use recovery_storage::error::StorageError;
use recovery_storage::TaskFormStore;
use tracing::warn;

/// Attempts before a turn gives up on a contended form instance.
pub const MAX_SAVE_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub enum Outcome {
    Accepted(Turn),
    /// The session refused the input; nothing was saved. `progress` is the
    /// stored state the input was checked against, for re-prompting.
    Refused {
        error: FormError,
        progress: PatientFormProgress,
    },
}

/// Apply `input` to the latest stored progress for the instance and save the
/// result. A conflicting save reloads and reapplies the input.
pub fn apply_turn<S: TaskFormStore + ?Sized>(
    store: &S,
    session: &FormSession,
    patient_id: &str,
    form_instance_id: &str,
    input: &str,
    patient_name: Option<&str>,
) -> eyre::Result<Outcome> {
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        let (progress, version) = match store.load_patient_form_progress(patient_id, form_instance_id)? {
            Some((progress, version)) => (progress, Some(version)),
            None => (session.new_progress(patient_id, form_instance_id), None),
        };

        let turn = match session.handle_input(&progress, input, patient_name, jiff::Timestamp::now()) {
            Ok(turn) => turn,
            Err(error) => return Ok(Outcome::Refused { error, progress }),
        };

        match store.save_patient_form_progress(&turn.progress, version.as_ref()) {
            Ok(_) => return Ok(Outcome::Accepted(turn)),
            Err(StorageError::Conflict { key }) => {
                warn!(key = %key, attempt, "progress changed underneath this turn, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(eyre::eyre!(
        "gave up saving form instance '{form_instance_id}' after {MAX_SAVE_ATTEMPTS} conflicting writes"
    ))
}

/// The refusal reason followed by the question again.
pub fn refusal_reply(
    session: &FormSession,
    error: &FormError,
    progress: &PatientFormProgress,
    patient_name: Option<&str>,
) -> String {
    match session.current_prompt(progress, patient_name) {
        Some(prompt) => format!("{error}\n\n{prompt}"),
        None => error.to_string(),
    }
}
