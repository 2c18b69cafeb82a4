use std::sync::LazyLock;

use jiff::civil::Date;
use recovery_core::models::conversation::ConversationalStep;
use recovery_core::models::form::QuestionType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use ts_rs::TS;

pub const REQUIRED_MESSAGE: &str = "This question requires an answer.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format.";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s().-]+$").expect("static regex"));

static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("static regex"));

static SLASHED_ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").expect("static regex"));

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap]\.?m\.?)?$").expect("static regex")
});

/// Outcome of checking one answer against its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Decide whether `value` (normally the output of
/// [`parse_input`](crate::parse::parse_input)) can be accepted for `step`.
///
/// This is the only place answer rules live. Pure and total.
pub fn validate(step: &ConversationalStep, value: &Value) -> ValidationResult {
    if is_empty(value) {
        return if step.required {
            ValidationResult::invalid(REQUIRED_MESSAGE)
        } else {
            ValidationResult::valid()
        };
    }

    let by_type = match step.question_type {
        QuestionType::Number => check_number(step, value),
        QuestionType::Scale | QuestionType::PainScale => check_scale(step, value),
        QuestionType::YesNo => check_yes_no(value),
        QuestionType::Email => check_email(value),
        QuestionType::Phone => check_phone(value),
        QuestionType::Date => check_date(value),
        QuestionType::Time => check_time(value),
        QuestionType::SingleChoice | QuestionType::MultipleChoice => check_choice(step, value),
        _ => Ok(()),
    };
    if let Err(message) = by_type {
        return ValidationResult::invalid(message);
    }

    if let Err(message) = check_pattern(step, value) {
        return ValidationResult::invalid(message);
    }
    ValidationResult::valid()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

fn check_bounds(step: &ConversationalStep, n: f64) -> Result<(), String> {
    let Some(rules) = &step.validation_rules else {
        return Ok(());
    };
    if let Some(min) = rules.min
        && n < min
    {
        return Err(format!("Value must be at least {}.", format_bound(min)));
    }
    if let Some(max) = rules.max
        && n > max
    {
        return Err(format!("Value must be at most {}.", format_bound(max)));
    }
    Ok(())
}

fn check_number(step: &ConversationalStep, value: &Value) -> Result<(), String> {
    let n = as_number(value).ok_or_else(|| "Please enter a valid number.".to_string())?;
    check_bounds(step, n)
}

fn check_scale(step: &ConversationalStep, value: &Value) -> Result<(), String> {
    let n = as_number(value)
        .filter(|n| (0.0..=10.0).contains(n))
        .ok_or_else(|| "Please enter a number from 0 to 10.".to_string())?;
    check_bounds(step, n)
}

fn check_yes_no(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some("yes") | Some("no") => Ok(()),
        _ => Err("Please answer yes or no.".to_string()),
    }
}

fn check_email(value: &Value) -> Result<(), String> {
    if EMAIL.is_match(&as_text(value)) {
        Ok(())
    } else {
        Err("Please enter a valid email address.".to_string())
    }
}

fn check_phone(value: &Value) -> Result<(), String> {
    let text = as_text(value);
    let digits = text.chars().filter(char::is_ascii_digit).count();
    if PHONE.is_match(&text) && digits == 10 {
        Ok(())
    } else {
        Err("Please enter a valid 10-digit phone number.".to_string())
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and `MM/DD/YYYY`, rejecting dates that
/// do not exist on the calendar.
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();
    if let Ok(date) = text.parse::<Date>() {
        return Some(date);
    }

    let (year, month, day) = if let Some(caps) = US_DATE.captures(text) {
        (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else if let Some(caps) = SLASHED_ISO_DATE.captures(text) {
        (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else {
        return None;
    };
    Date::new(year, month, day).ok()
}

fn check_date(value: &Value) -> Result<(), String> {
    match parse_date(&as_text(value)) {
        Some(_) => Ok(()),
        None => Err("Please enter a valid date (MM/DD/YYYY).".to_string()),
    }
}

fn check_time(value: &Value) -> Result<(), String> {
    let text = as_text(value);
    let invalid = || "Please enter a valid time, such as 8:30 AM.".to_string();
    let caps = TIME.captures(&text).ok_or_else(invalid)?;

    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    let meridiem = caps.get(3).is_some();

    // A bare hour is only unambiguous with AM/PM.
    if caps.get(2).is_none() && !meridiem {
        return Err(invalid());
    }
    let hour_ok = if meridiem { (1..=12).contains(&hour) } else { hour <= 23 };
    if hour_ok && minute <= 59 {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn check_choice(step: &ConversationalStep, value: &Value) -> Result<(), String> {
    let known = |v: &Value| {
        v.as_str()
            .is_some_and(|s| step.options.iter().any(|o| o.value == s))
    };
    let ok = match value {
        Value::Array(items) => {
            step.question_type == QuestionType::MultipleChoice && items.iter().all(known)
        }
        other => known(other),
    };
    if ok {
        Ok(())
    } else {
        Err("Please choose one of the listed options.".to_string())
    }
}

fn check_pattern(step: &ConversationalStep, value: &Value) -> Result<(), String> {
    let Some(rules) = &step.validation_rules else {
        return Ok(());
    };
    let Some(pattern) = rules.pattern.as_deref() else {
        return Ok(());
    };

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(step_id = %step.id, error = %e, "ignoring unusable validation pattern");
            return Ok(());
        }
    };
    if regex.is_match(&as_text(value)) {
        Ok(())
    } else {
        Err(rules
            .message
            .clone()
            .unwrap_or_else(|| INVALID_FORMAT_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_input;
    use recovery_core::models::form::{ChoiceOption, ValidationRules};
    use serde_json::json;

    const ALL_TYPES: [QuestionType; 15] = [
        QuestionType::Text,
        QuestionType::Number,
        QuestionType::YesNo,
        QuestionType::Scale,
        QuestionType::PainScale,
        QuestionType::MultipleChoice,
        QuestionType::SingleChoice,
        QuestionType::Date,
        QuestionType::Time,
        QuestionType::Email,
        QuestionType::Phone,
        QuestionType::MedicationSearch,
        QuestionType::ConditionSearch,
        QuestionType::FileUpload,
        QuestionType::ImageUpload,
    ];

    fn step(question_type: QuestionType, required: bool) -> ConversationalStep {
        ConversationalStep {
            id: "s/q".to_string(),
            position: 1,
            section_id: "s".to_string(),
            section_name: "Section".to_string(),
            question_id: "q".to_string(),
            text: "Question".to_string(),
            question_type,
            required,
            options: vec![
                ChoiceOption { label: "Mild".into(), value: "mild".into() },
                ChoiceOption { label: "Severe".into(), value: "severe".into() },
            ],
            validation_rules: None,
            help_text: None,
            medical_definition: None,
            next_step_id: None,
            conditional_next: Vec::new(),
        }
    }

    fn check(step: &ConversationalStep, raw: &str) -> ValidationResult {
        validate(step, &parse_input(step, raw))
    }

    #[test]
    fn required_rejects_empty_for_every_type() {
        for t in ALL_TYPES {
            let result = validate(&step(t, true), &json!(""));
            assert_eq!(result, ValidationResult::invalid(REQUIRED_MESSAGE), "{t:?}");
            assert!(!validate(&step(t, true), &Value::Null).is_valid);
        }
    }

    #[test]
    fn optional_empty_is_valid_for_every_type() {
        for t in ALL_TYPES {
            assert!(validate(&step(t, false), &json!("  ")).is_valid, "{t:?}");
        }
    }

    #[test]
    fn pain_scale_bounds() {
        let s = step(QuestionType::PainScale, true);
        assert!(!check(&s, "11").is_valid);
        assert!(!check(&s, "-1").is_valid);
        assert!(check(&s, "0").is_valid);
        assert!(check(&s, "10").is_valid);
        assert!(check(&s, "about a 4").is_valid);
        assert!(!check(&s, "bad").is_valid);
    }

    #[test]
    fn yes_no_after_parsing() {
        let s = step(QuestionType::YesNo, true);
        let parsed = parse_input(&s, "Yep");
        assert_eq!(parsed, json!("yes"));
        assert!(validate(&s, &parsed).is_valid);
        assert!(!check(&s, "perhaps").is_valid);
        assert!(!validate(&s, &json!("Yes")).is_valid);
    }

    #[test]
    fn number_bounds_name_the_violated_limit() {
        let mut s = step(QuestionType::Number, true);
        s.validation_rules = Some(ValidationRules {
            min: Some(95.0),
            max: Some(106.5),
            ..Default::default()
        });
        assert_eq!(check(&s, "94").error.as_deref(), Some("Value must be at least 95."));
        assert_eq!(check(&s, "107").error.as_deref(), Some("Value must be at most 106.5."));
        assert!(check(&s, "98.6").is_valid);
        assert!(check(&s, "95").is_valid);
        assert!(!validate(&s, &json!("NaN")).is_valid);
        assert!(!validate(&s, &json!("inf")).is_valid);
    }

    #[test]
    fn email_and_phone() {
        let email = step(QuestionType::Email, true);
        assert!(check(&email, "pat@example.org").is_valid);
        assert!(!check(&email, "pat@example").is_valid);
        assert!(!check(&email, "pat example@x.org").is_valid);

        let phone = step(QuestionType::Phone, true);
        assert!(check(&phone, "555-123-4567").is_valid);
        assert!(check(&phone, "(555) 123-4567").is_valid);
        assert!(check(&phone, "5551234567").is_valid);
        assert!(!check(&phone, "555-1234").is_valid);
        assert!(!check(&phone, "1-555-123-4567").is_valid);
        assert!(!check(&phone, "555-CALL-NOW").is_valid);
    }

    #[test]
    fn dates_must_exist() {
        let s = step(QuestionType::Date, true);
        assert!(check(&s, "2026-04-02").is_valid);
        assert!(check(&s, "04/02/2026").is_valid);
        assert!(check(&s, "2024/02/29").is_valid);
        assert!(!check(&s, "02/30/2026").is_valid);
        assert!(!check(&s, "2026-13-01").is_valid);
        assert!(!check(&s, "next tuesday").is_valid);
        assert_eq!(parse_date("4/2/2026"), Some(jiff::civil::date(2026, 4, 2)));
    }

    #[test]
    fn times() {
        let s = step(QuestionType::Time, true);
        assert!(check(&s, "8:30 AM").is_valid);
        assert!(check(&s, "20:30").is_valid);
        assert!(check(&s, "9pm").is_valid);
        assert!(!check(&s, "9").is_valid);
        assert!(!check(&s, "13:00 pm").is_valid);
        assert!(!check(&s, "24:00").is_valid);
    }

    #[test]
    fn choices_must_be_listed() {
        let single = step(QuestionType::SingleChoice, true);
        assert!(check(&single, "2").is_valid);
        assert!(check(&single, "mild").is_valid);
        assert!(!check(&single, "3").is_valid);
        assert!(!validate(&single, &json!(["mild"])).is_valid);

        let multiple = step(QuestionType::MultipleChoice, true);
        assert!(check(&multiple, "1, 2").is_valid);
        assert!(!check(&multiple, "1, 7").is_valid);
    }

    #[test]
    fn custom_pattern_uses_author_message() {
        let mut s = step(QuestionType::Text, true);
        s.validation_rules = Some(ValidationRules {
            pattern: Some(r"^MRN-\d{6}$".into()),
            message: Some("Enter your MRN, e.g. MRN-123456.".into()),
            ..Default::default()
        });
        assert!(check(&s, "MRN-004211").is_valid);
        assert_eq!(
            check(&s, "4211").error.as_deref(),
            Some("Enter your MRN, e.g. MRN-123456.")
        );

        s.validation_rules.as_mut().unwrap().message = None;
        assert_eq!(check(&s, "4211").error.as_deref(), Some(INVALID_FORMAT_MESSAGE));
    }

    #[test]
    fn unusable_pattern_is_ignored() {
        let mut s = step(QuestionType::Text, false);
        s.validation_rules = Some(ValidationRules {
            pattern: Some("([".into()),
            ..Default::default()
        });
        assert!(check(&s, "anything").is_valid);
    }

    #[test]
    fn untyped_answers_pass() {
        assert!(check(&step(QuestionType::MedicationSearch, false), "ibuprofen").is_valid);
        assert!(check(&step(QuestionType::Text, true), "a bit sore").is_valid);
    }
}
