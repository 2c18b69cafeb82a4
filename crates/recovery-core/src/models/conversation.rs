use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::form::{ChoiceOption, QuestionType, ValidationRules};

/// A branch out of a step taken when an answer matches `when_value`.
///
/// Part of the output shape only: no rule source populates it yet, so
/// compiled flows always carry an empty list and follow `next_step_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConditionalNext {
    pub when_value: String,
    pub next_step_id: String,
}

/// One question rendered as a single turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversationalStep {
    pub id: String,
    /// 1-based position in the flow.
    pub position: usize,
    pub section_id: String,
    pub section_name: String,
    pub question_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub required: bool,
    pub options: Vec<ChoiceOption>,
    pub validation_rules: Option<ValidationRules>,
    pub help_text: Option<String>,
    pub medical_definition: Option<String>,
    pub next_step_id: Option<String>,
    #[serde(default)]
    pub conditional_next: Vec<ConditionalNext>,
}

/// A form compiled into a linear conversational flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversationalFormData {
    pub form_id: String,
    pub form_name: String,
    pub description: String,
    pub estimated_minutes: u32,
    pub allow_partial_completion: bool,
    pub voice_enabled: bool,
    pub total_questions: usize,
    pub required_questions: usize,
    pub intro_message: String,
    pub completion_message: String,
    pub steps: Vec<ConversationalStep>,
}

impl ConversationalFormData {
    pub fn step(&self, step_id: &str) -> Option<&ConversationalStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_for_question(&self, question_id: &str) -> Option<&ConversationalStep> {
        self.steps.iter().find(|s| s.question_id == question_id)
    }

    pub fn first_step(&self) -> Option<&ConversationalStep> {
        self.steps.first()
    }

    /// The step whose `next_step_id` points at `step_id`.
    pub fn previous_step_id(&self, step_id: &str) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.next_step_id.as_deref() == Some(step_id))
            .map(|s| s.id.as_str())
    }
}
