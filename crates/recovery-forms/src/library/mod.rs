//! Built-in recovery forms.
//!
//! Ready-made definitions providers can attach to a protocol without
//! authoring their own. Each is plain data compiled like any stored form.

pub mod daily_check_in;
pub mod pre_op_intake;
pub mod wound_check;

use recovery_core::models::form::{ChoiceOption, FormDefinition, Question, QuestionType, ValidationRules};

/// Trait implemented by each built-in form.
pub trait StandardForm: Send + Sync {
    fn definition(&self) -> &FormDefinition;

    /// Unique identifier (e.g., "daily_check_in").
    fn id(&self) -> &str {
        &self.definition().id
    }

    /// Human-readable name.
    fn name(&self) -> &str {
        &self.definition().name
    }
}

/// Return all built-in forms.
pub fn all_forms() -> Vec<Box<dyn StandardForm>> {
    vec![
        Box::new(daily_check_in::DailyCheckIn),
        Box::new(wound_check::WoundCheck),
        Box::new(pre_op_intake::PreOpIntake),
    ]
}

/// Look up a built-in form by ID.
pub fn get_form(id: &str) -> Option<Box<dyn StandardForm>> {
    all_forms().into_iter().find(|f| f.id() == id)
}

fn question(id: &str, text: &str, question_type: QuestionType, required: bool) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        question_type,
        required,
        options: Vec::new(),
        validation_rules: None,
        help_text: None,
        medical_definition: None,
    }
}

fn options(pairs: &[(&str, &str)]) -> Vec<ChoiceOption> {
    pairs
        .iter()
        .map(|(value, label)| ChoiceOption {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect()
}

fn range(min: f64, max: f64) -> Option<ValidationRules> {
    Some(ValidationRules {
        min: Some(min),
        max: Some(max),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::compiler::compile;

    #[test]
    fn every_builtin_form_is_well_formed() {
        let mut ids = HashSet::new();
        for form in all_forms() {
            assert!(ids.insert(form.id().to_string()), "duplicate id {}", form.id());
            form.definition().check().unwrap();

            let compiled = compile(form.definition());
            assert!(compiled.total_questions > 0, "{} has no questions", form.id());
            assert!(compiled.required_questions <= compiled.total_questions);
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(get_form("wound_check").unwrap().name(), "Wound Check");
        assert!(get_form("nope").is_none());
    }
}
