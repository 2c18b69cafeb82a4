use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// The closed set of answer types a question can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestionType {
    Text,
    Number,
    YesNo,
    /// Generic 0–10 rating.
    Scale,
    /// 0 (no pain) to 10 (worst imaginable).
    PainScale,
    MultipleChoice,
    SingleChoice,
    Date,
    Time,
    Email,
    Phone,
    MedicationSearch,
    ConditionSearch,
    FileUpload,
    ImageUpload,
}

impl QuestionType {
    /// Whether answers are picked from the question's option list.
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::SingleChoice)
    }

    /// Whether answers are parsed into numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            QuestionType::Number | QuestionType::Scale | QuestionType::PainScale
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

/// Author-supplied constraints on an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression the answer must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Shown instead of the generic message when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Clinical annotation for providers. Never used for validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormSection {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub questions: Vec<Question>,
}

/// A named assessment instrument delivered to patients as a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sections: Vec<FormSection>,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub allow_partial_completion: bool,
    #[serde(default)]
    pub voice_enabled: bool,
}

impl FormDefinition {
    /// Validate a form definition loaded from outside the process.
    ///
    /// Section sort orders and question ids must be unique across the form,
    /// and choice questions must offer at least one option.
    pub fn check(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidForm {
            form_id: self.id.clone(),
            reason,
        };

        let mut sort_orders = HashSet::new();
        let mut question_ids = HashSet::new();
        for section in &self.sections {
            if !sort_orders.insert(section.sort_order) {
                return Err(invalid(format!(
                    "sort_order {} is used by more than one section",
                    section.sort_order
                )));
            }
            for question in &section.questions {
                if !question_ids.insert(question.id.as_str()) {
                    return Err(invalid(format!("duplicate question id '{}'", question.id)));
                }
                if question.question_type.is_choice() && question.options.is_empty() {
                    return Err(invalid(format!(
                        "choice question '{}' has no options",
                        question.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}
