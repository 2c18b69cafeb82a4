use recovery_core::models::form::{FormDefinition, FormSection, QuestionType, ValidationRules};

use super::{question, StandardForm};

/// Pre-operative intake collected in the weeks before surgery.
pub struct PreOpIntake;

impl StandardForm for PreOpIntake {
    fn definition(&self) -> &FormDefinition {
        static FORM: std::sync::LazyLock<FormDefinition> = std::sync::LazyLock::new(|| {
            let mut mrn = question(
                "mrn",
                "What is your medical record number?",
                QuestionType::Text,
                true,
            );
            mrn.help_text = Some("It is printed on your hospital wristband or letter.".to_string());
            mrn.validation_rules = Some(ValidationRules {
                pattern: Some(r"^\d{6,10}$".to_string()),
                message: Some("A medical record number is 6 to 10 digits.".to_string()),
                ..Default::default()
            });

            FormDefinition {
                id: "pre_op_intake".to_string(),
                name: "Pre-Op Intake".to_string(),
                description: "Some details we need before your surgery.".to_string(),
                sections: vec![
                    FormSection {
                        id: "contact".to_string(),
                        name: "Contact".to_string(),
                        sort_order: 1,
                        questions: vec![
                            mrn,
                            question(
                                "surgery_date",
                                "What date is your surgery scheduled for?",
                                QuestionType::Date,
                                true,
                            ),
                            question(
                                "arrival_time",
                                "What time were you asked to arrive?",
                                QuestionType::Time,
                                false,
                            ),
                            question(
                                "email",
                                "What email address should we use for reminders?",
                                QuestionType::Email,
                                false,
                            ),
                            question(
                                "emergency_phone",
                                "What is the phone number of your emergency contact?",
                                QuestionType::Phone,
                                true,
                            ),
                        ],
                    },
                    FormSection {
                        id: "history".to_string(),
                        name: "Medical history".to_string(),
                        sort_order: 2,
                        questions: vec![
                            question(
                                "medications",
                                "Which medications do you take regularly?",
                                QuestionType::MedicationSearch,
                                true,
                            ),
                            question(
                                "conditions",
                                "Do you have any ongoing health conditions?",
                                QuestionType::ConditionSearch,
                                false,
                            ),
                            question(
                                "blood_thinner",
                                "Do you take a blood thinner?",
                                QuestionType::YesNo,
                                true,
                            ),
                            question(
                                "insurance_card",
                                "Please upload a picture or scan of your insurance card.",
                                QuestionType::FileUpload,
                                false,
                            ),
                        ],
                    },
                ],
                estimated_minutes: 8,
                allow_partial_completion: false,
                voice_enabled: false,
            }
        });
        &FORM
    }
}
