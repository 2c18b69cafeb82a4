use recovery_core::models::form::{FormDefinition, FormSection, QuestionType};

use super::{options, question, range, StandardForm};

/// Incision check for signs of infection. All questions except the photo are
/// required; the answers feed the provider's infection review.
pub struct WoundCheck;

impl StandardForm for WoundCheck {
    fn definition(&self) -> &FormDefinition {
        static FORM: std::sync::LazyLock<FormDefinition> = std::sync::LazyLock::new(|| {
            let mut drainage = question(
                "drainage",
                "What does any drainage from the incision look like?",
                QuestionType::SingleChoice,
                true,
            );
            drainage.options = options(&[
                ("none", "No drainage"),
                ("clear", "Clear or pink"),
                ("cloudy", "Cloudy, yellow or green"),
                ("bloody", "Bright red blood"),
            ]);
            drainage.medical_definition = Some(
                "Purulent (cloudy/yellow/green) drainage is a sign of surgical site infection."
                    .to_string(),
            );

            let mut temperature = question(
                "temperature",
                "What is your temperature in °F?",
                QuestionType::Number,
                true,
            );
            temperature.validation_rules = range(93.0, 108.0);
            temperature.help_text = Some("Take it by mouth if you can.".to_string());

            let mut symptoms = question(
                "symptoms",
                "Do you notice any of these around the incision?",
                QuestionType::MultipleChoice,
                false,
            );
            symptoms.options = options(&[
                ("redness", "Spreading redness"),
                ("warmth", "Warmth"),
                ("odor", "Bad smell"),
                ("opening", "Edges pulling apart"),
            ]);

            FormDefinition {
                id: "wound_check".to_string(),
                name: "Wound Check".to_string(),
                description: "A few questions about your incision.".to_string(),
                sections: vec![
                    FormSection {
                        id: "incision".to_string(),
                        name: "Incision".to_string(),
                        sort_order: 1,
                        questions: vec![
                            drainage,
                            symptoms,
                            question(
                                "photo",
                                "Please share a photo of your incision.",
                                QuestionType::ImageUpload,
                                false,
                            ),
                        ],
                    },
                    FormSection {
                        id: "vitals".to_string(),
                        name: "Vitals".to_string(),
                        sort_order: 2,
                        questions: vec![
                            temperature,
                            question("chills", "Have you had chills?", QuestionType::YesNo, true),
                        ],
                    },
                ],
                estimated_minutes: 3,
                allow_partial_completion: false,
                voice_enabled: true,
            }
        });
        &FORM
    }
}
