use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// An answer the validator refused. Recoverable: re-prompt the same step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct ValidationError {
    pub step_id: String,
    pub question_id: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid answer: {0}")]
    Validation(#[from] ValidationError),

    /// The step is not in the compiled flow, usually stale client state
    /// after the form was recompiled. Refetch and resume from the recorded
    /// `current_step_id`.
    #[error("unknown step '{step_id}' in form '{form_id}'")]
    UnknownStep { form_id: String, step_id: String },

    #[error("step '{step_id}' is required and cannot be skipped")]
    SkipNotAllowed { step_id: String },

    #[error("form instance '{form_instance_id}' is already completed")]
    AlreadyCompleted { form_instance_id: String },

    #[error("progress belongs to form '{actual}', not '{expected}'")]
    FormMismatch { expected: String, actual: String },
}
