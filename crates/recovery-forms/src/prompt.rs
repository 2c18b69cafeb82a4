use recovery_core::models::conversation::ConversationalStep;
use recovery_core::models::form::QuestionType;

/// Render the chat prompt for a step.
///
/// Total and side-effect free; the transport decides how to deliver it.
pub fn render_prompt(step: &ConversationalStep, patient_name: Option<&str>) -> String {
    let mut prompt = personalize(&step.text, patient_name);

    if let Some(help) = step.help_text.as_deref().filter(|h| !h.trim().is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(help.trim());
    }

    if let Some(guidance) = guidance(step) {
        prompt.push_str("\n\n");
        prompt.push_str(&guidance);
    }

    if !step.required {
        prompt.push_str("\n\n(Optional. Reply \"skip\" to move on.)");
    }
    prompt
}

fn personalize(text: &str, patient_name: Option<&str>) -> String {
    let text = text.trim();
    let Some(name) = patient_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return text.to_string();
    };

    // Lowercase the leading letter unless it starts an acronym or "I".
    let mut chars = text.chars();
    let lowered = match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_lowercase() => {
            let mut s: String = first.to_lowercase().collect();
            s.push_str(&text[first.len_utf8()..]);
            s
        }
        _ => text.to_string(),
    };
    format!("{name}, {lowered}")
}

fn guidance(step: &ConversationalStep) -> Option<String> {
    let rules = step.validation_rules.as_ref();
    let min = rules.and_then(|r| r.min);
    let max = rules.and_then(|r| r.max);

    let text = match step.question_type {
        QuestionType::YesNo => "Please answer yes or no.".to_string(),
        QuestionType::PainScale => {
            "Please rate from 0 to 10, where 0 is no pain and 10 is the worst pain imaginable."
                .to_string()
        }
        QuestionType::Scale => format!(
            "Please answer on a scale from {} to {}.",
            format_number(min.unwrap_or(0.0).max(0.0)),
            format_number(max.unwrap_or(10.0).min(10.0)),
        ),
        QuestionType::Number => match (min, max) {
            (Some(lo), Some(hi)) => format!(
                "Please enter a number between {} and {}.",
                format_number(lo),
                format_number(hi)
            ),
            (Some(lo), None) => format!("Please enter a number of at least {}.", format_number(lo)),
            (None, Some(hi)) => format!("Please enter a number up to {}.", format_number(hi)),
            (None, None) => "Please enter a number.".to_string(),
        },
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            if step.options.is_empty() {
                return None;
            }
            let mut list: Vec<String> = step
                .options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}. {}", i + 1, o.label))
                .collect();
            list.push(String::new());
            let mut text = list.join("\n");
            if step.question_type == QuestionType::MultipleChoice {
                text.push_str(
                    "Reply with the numbers or names of all that apply, separated by commas.",
                );
            } else {
                text.push_str("Reply with the number or the name of your choice.");
            }
            text
        }
        QuestionType::Date => "Please use the format MM/DD/YYYY.".to_string(),
        QuestionType::Time => "For example: 8:30 AM or 20:30.".to_string(),
        QuestionType::Email => "Please enter your email address.".to_string(),
        QuestionType::Phone => "Please enter a 10-digit phone number.".to_string(),
        QuestionType::MedicationSearch => {
            "Type the name of the medication as it appears on the label.".to_string()
        }
        QuestionType::ConditionSearch => "Type the name of the condition.".to_string(),
        QuestionType::FileUpload => "Please attach the file using the upload button.".to_string(),
        QuestionType::ImageUpload => {
            "Please attach a photo using the camera or upload button.".to_string()
        }
        QuestionType::Text => return None,
    };
    Some(text)
}

/// Whole numbers print without a trailing ".0".
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
