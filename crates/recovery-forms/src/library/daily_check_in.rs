use recovery_core::models::form::{FormDefinition, FormSection, QuestionType};

use super::{options, question, StandardForm};

/// Short daily symptom check-in used through the first weeks after surgery.
/// Five questions; partial completion allowed so a tired patient can stop early.
pub struct DailyCheckIn;

impl StandardForm for DailyCheckIn {
    fn definition(&self) -> &FormDefinition {
        static FORM: std::sync::LazyLock<FormDefinition> = std::sync::LazyLock::new(|| {
            let mut pain = question(
                "pain_now",
                "How would you rate your pain right now?",
                QuestionType::PainScale,
                true,
            );
            pain.medical_definition =
                Some("Numeric Rating Scale (NRS-11) for current pain intensity.".to_string());

            let mut sleep = question(
                "sleep_quality",
                "How well did you sleep last night?",
                QuestionType::SingleChoice,
                true,
            );
            sleep.options = options(&[
                ("good", "Well"),
                ("fair", "Okay"),
                ("poor", "Poorly"),
            ]);

            let mut meds = question(
                "took_medication",
                "Did you take your medications as prescribed today?",
                QuestionType::YesNo,
                true,
            );
            meds.help_text = Some("Include pain medication and blood thinners.".to_string());

            FormDefinition {
                id: "daily_check_in".to_string(),
                name: "Daily Check-In".to_string(),
                description: "A quick look at how your recovery is going today.".to_string(),
                sections: vec![
                    FormSection {
                        id: "symptoms".to_string(),
                        name: "Symptoms".to_string(),
                        sort_order: 1,
                        questions: vec![
                            pain,
                            question(
                                "swelling",
                                "How much swelling do you have compared to yesterday, from 0 to 10?",
                                QuestionType::Scale,
                                false,
                            ),
                            sleep,
                        ],
                    },
                    FormSection {
                        id: "routine".to_string(),
                        name: "Routine".to_string(),
                        sort_order: 2,
                        questions: vec![
                            meds,
                            question(
                                "notes",
                                "Is there anything else you want your care team to know?",
                                QuestionType::Text,
                                false,
                            ),
                        ],
                    },
                ],
                estimated_minutes: 2,
                allow_partial_completion: true,
                voice_enabled: true,
            }
        });
        &FORM
    }
}
