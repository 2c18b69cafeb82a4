use std::collections::BTreeSet;

use recovery_core::models::conversation::{ConversationalFormData, ConversationalStep};
use recovery_core::models::form::FormDefinition;
use recovery_core::models::progress::{PatientFormProgress, ProgressStatus, RecordedResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::compiler::compile;
use crate::error::{FormError, ValidationError};
use crate::intent::{classify_intent, Intent};
use crate::parse::parse_input;
use crate::prompt::render_prompt;
use crate::validate::validate;

pub const PAUSED_MESSAGE: &str =
    "Your answers are saved. You can pick up where you left off at any time.";

/// What a turn did with the patient's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TurnAction {
    Answered,
    Skipped,
    WentBack,
    Paused,
}

/// Result of one accepted turn: the new progress plus what to say next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Turn {
    pub action: TurnAction,
    pub progress: PatientFormProgress,
    pub completion_percentage: u32,
    /// Next prompt, the completion message, or the paused notice.
    pub reply: String,
}

/// `completed / total * 100`, rounded. An empty form counts as fully done
/// once completed.
pub fn completion_percentage(progress: &PatientFormProgress, total_questions: usize) -> u32 {
    if total_questions == 0 {
        return if progress.is_completed() { 100 } else { 0 };
    }
    let done = progress.completed_step_ids.len().min(total_questions);
    ((done as f64 / total_questions as f64) * 100.0).round() as u32
}

/// Drives patients through one compiled form.
///
/// Every operation takes the current progress by reference and returns the
/// next value; on error the caller still holds the unchanged original. The
/// status only moves `pending → in_progress → completed`.
#[derive(Debug, Clone)]
pub struct FormSession {
    form: ConversationalFormData,
}

impl FormSession {
    pub fn new(form: ConversationalFormData) -> Self {
        Self { form }
    }

    pub fn from_definition(definition: &FormDefinition) -> Self {
        Self::new(compile(definition))
    }

    pub fn form(&self) -> &ConversationalFormData {
        &self.form
    }

    /// Fresh progress for a patient's first interaction with a form instance.
    pub fn new_progress(&self, patient_id: &str, form_instance_id: &str) -> PatientFormProgress {
        PatientFormProgress {
            patient_id: patient_id.to_string(),
            form_instance_id: form_instance_id.to_string(),
            form_id: self.form.form_id.clone(),
            current_step_id: self.form.first_step().map(|s| s.id.clone()),
            responses: Vec::new(),
            completed_step_ids: BTreeSet::new(),
            status: ProgressStatus::Pending,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn completion_percentage(&self, progress: &PatientFormProgress) -> u32 {
        completion_percentage(progress, self.form.total_questions)
    }

    /// Prompt for the step the patient is on, if any.
    pub fn current_prompt(
        &self,
        progress: &PatientFormProgress,
        patient_name: Option<&str>,
    ) -> Option<String> {
        if progress.is_completed() {
            return None;
        }
        let step_id = progress.current_step_id.as_deref()?;
        self.form.step(step_id).map(|s| render_prompt(s, patient_name))
    }

    /// Explicit start: `pending → in_progress`. A form without questions
    /// completes immediately.
    pub fn start(
        &self,
        progress: &PatientFormProgress,
        now: jiff::Timestamp,
    ) -> Result<PatientFormProgress, FormError> {
        self.ensure_open(progress)?;
        let mut next = progress.clone();
        mark_started(&mut next, now);
        if next.current_step_id.is_none() {
            self.settle_at_end(&mut next, now);
        }
        Ok(next)
    }

    /// Parse, validate and store an answer for `step_id`, then advance to
    /// that step's successor.
    pub fn record_response(
        &self,
        progress: &PatientFormProgress,
        step_id: &str,
        raw: &str,
        now: jiff::Timestamp,
    ) -> Result<PatientFormProgress, FormError> {
        self.ensure_open(progress)?;
        let step = self.step(step_id)?;

        let value = parse_input(step, raw);
        let result = validate(step, &value);
        if !result.is_valid {
            return Err(ValidationError {
                step_id: step.id.clone(),
                question_id: step.question_id.clone(),
                message: result.error.unwrap_or_default(),
            }
            .into());
        }

        let mut next = progress.clone();
        next.responses.retain(|r| r.question_id != step.question_id);
        next.responses.push(RecordedResponse {
            question_id: step.question_id.clone(),
            value,
            answered_at: now,
        });
        next.completed_step_ids.insert(step.id.clone());
        mark_started(&mut next, now);
        self.advance(&mut next, step.next_step_id.clone(), now);

        debug!(
            form_instance_id = %next.form_instance_id,
            step_id = %step.id,
            status = ?next.status,
            "recorded response"
        );
        Ok(next)
    }

    /// Move past the current step without answering it. Required steps may
    /// only be skipped when the form allows partial completion.
    pub fn skip(
        &self,
        progress: &PatientFormProgress,
        now: jiff::Timestamp,
    ) -> Result<PatientFormProgress, FormError> {
        self.ensure_open(progress)?;
        let Some(step_id) = progress.current_step_id.as_deref() else {
            return self.start(progress, now);
        };
        let step = self.step(step_id)?;
        if step.required && !self.form.allow_partial_completion {
            return Err(FormError::SkipNotAllowed {
                step_id: step.id.clone(),
            });
        }

        let mut next = progress.clone();
        mark_started(&mut next, now);
        self.advance(&mut next, step.next_step_id.clone(), now);
        debug!(form_instance_id = %next.form_instance_id, step_id = %step.id, "skipped step");
        Ok(next)
    }

    /// Return to the previous step. Stays put on the first step.
    pub fn back(&self, progress: &PatientFormProgress) -> Result<PatientFormProgress, FormError> {
        self.ensure_open(progress)?;
        let mut next = progress.clone();
        next.current_step_id = match progress.current_step_id.as_deref() {
            Some(step_id) => {
                let step = self.step(step_id)?;
                Some(
                    self.form
                        .previous_step_id(&step.id)
                        .unwrap_or(&step.id)
                        .to_string(),
                )
            }
            None => self.form.steps.last().map(|s| s.id.clone()),
        };
        Ok(next)
    }

    /// Stop for now. Forms allowing partial completion are completed as they
    /// stand; others keep their place for a later session.
    pub fn pause(
        &self,
        progress: &PatientFormProgress,
        now: jiff::Timestamp,
    ) -> Result<PatientFormProgress, FormError> {
        self.ensure_open(progress)?;
        let mut next = progress.clone();
        if self.form.allow_partial_completion {
            mark_started(&mut next, now);
            next.current_step_id = None;
            next.status = ProgressStatus::Completed;
            next.completed_at = Some(now);
            debug!(
                form_instance_id = %next.form_instance_id,
                percentage = self.completion_percentage(&next),
                "form finished early"
            );
        }
        Ok(next)
    }

    /// Handle one raw chat message: control intents first, then the message
    /// is taken as the answer to the current step.
    pub fn handle_input(
        &self,
        progress: &PatientFormProgress,
        raw: &str,
        patient_name: Option<&str>,
        now: jiff::Timestamp,
    ) -> Result<Turn, FormError> {
        let (action, next) = match classify_intent(raw) {
            Some(Intent::Skip) => (TurnAction::Skipped, self.skip(progress, now)?),
            Some(Intent::Back) => (TurnAction::WentBack, self.back(progress)?),
            Some(Intent::Pause) => (TurnAction::Paused, self.pause(progress, now)?),
            None => match progress.current_step_id.as_deref() {
                Some(step_id) => (
                    TurnAction::Answered,
                    self.record_response(progress, step_id, raw, now)?,
                ),
                None => (TurnAction::Answered, self.start(progress, now)?),
            },
        };

        let reply = if next.is_completed() {
            self.form.completion_message.clone()
        } else if action == TurnAction::Paused {
            PAUSED_MESSAGE.to_string()
        } else {
            self.current_prompt(&next, patient_name).unwrap_or_default()
        };

        Ok(Turn {
            action,
            completion_percentage: self.completion_percentage(&next),
            progress: next,
            reply,
        })
    }

    fn step(&self, step_id: &str) -> Result<&ConversationalStep, FormError> {
        self.form.step(step_id).ok_or_else(|| FormError::UnknownStep {
            form_id: self.form.form_id.clone(),
            step_id: step_id.to_string(),
        })
    }

    fn ensure_open(&self, progress: &PatientFormProgress) -> Result<(), FormError> {
        if progress.form_id != self.form.form_id {
            return Err(FormError::FormMismatch {
                expected: self.form.form_id.clone(),
                actual: progress.form_id.clone(),
            });
        }
        if progress.is_completed() {
            return Err(FormError::AlreadyCompleted {
                form_instance_id: progress.form_instance_id.clone(),
            });
        }
        Ok(())
    }

    fn advance(&self, progress: &mut PatientFormProgress, next: Option<String>, now: jiff::Timestamp) {
        progress.current_step_id = next;
        if progress.current_step_id.is_none() {
            self.settle_at_end(progress, now);
        }
    }

    /// The flow has been walked to its end: complete when every required
    /// step is answered, otherwise send the patient to the first gap.
    fn settle_at_end(&self, progress: &mut PatientFormProgress, now: jiff::Timestamp) {
        let missing = self
            .form
            .steps
            .iter()
            .find(|s| s.required && !progress.completed_step_ids.contains(&s.id));

        match missing {
            Some(step) => {
                progress.status = ProgressStatus::InProgress;
                progress.current_step_id = Some(step.id.clone());
            }
            None => {
                progress.status = ProgressStatus::Completed;
                progress.completed_at = Some(now);
            }
        }
    }
}

fn mark_started(progress: &mut PatientFormProgress, now: jiff::Timestamp) {
    if progress.status == ProgressStatus::Pending {
        progress.status = ProgressStatus::InProgress;
        progress.started_at = Some(now);
    }
}
