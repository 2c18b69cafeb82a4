use std::sync::LazyLock;

use recovery_core::models::conversation::ConversationalStep;
use recovery_core::models::form::{ChoiceOption, QuestionType};
use regex::Regex;
use serde_json::Value;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("static regex"));

static ITEM_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,;]\s*").expect("static regex"));

static AND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").expect("static regex"));

const YES_WORDS: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "okay", "true"];
const NO_WORDS: &[&str] = &["no", "n", "nope", "nah", "false"];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Normalize a raw typed or transcribed answer into a value for validation.
///
/// Never fails: input that cannot be interpreted comes back as the trimmed
/// string and validation decides whether to reject it.
pub fn parse_input(step: &ConversationalStep, raw: &str) -> Value {
    let trimmed = raw.trim();

    match step.question_type {
        QuestionType::YesNo => parse_yes_no(trimmed),
        QuestionType::Number | QuestionType::Scale | QuestionType::PainScale => {
            parse_number(trimmed)
        }
        QuestionType::SingleChoice => resolve_option(&step.options, trimmed)
            .map(|o| Value::String(o.value.clone()))
            .unwrap_or_else(|| Value::String(trimmed.to_string())),
        QuestionType::MultipleChoice => parse_multiple(&step.options, trimmed),
        _ => Value::String(trimmed.to_string()),
    }
}

/// Lowercase and drop the trailing punctuation speech-to-text tends to add.
fn normalize_word(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_lowercase()
}

fn parse_yes_no(trimmed: &str) -> Value {
    let word = normalize_word(trimmed);
    if YES_WORDS.contains(&word.as_str()) {
        Value::String("yes".to_string())
    } else if NO_WORDS.contains(&word.as_str()) {
        Value::String("no".to_string())
    } else {
        Value::String(trimmed.to_string())
    }
}

fn parse_number(trimmed: &str) -> Value {
    if let Some(found) = FIRST_NUMBER.find(trimmed)
        && let Ok(n) = found.as_str().parse::<f64>()
    {
        return number_value(n).unwrap_or_else(|| Value::String(trimmed.to_string()));
    }

    let lowered = trimmed.to_lowercase();
    let spoken = lowered
        .split(|c: char| !c.is_alphabetic())
        .find_map(|w| NUMBER_WORDS.iter().position(|n| *n == w));
    match spoken {
        Some(n) => Value::from(n as i64),
        None => Value::String(trimmed.to_string()),
    }
}

/// Integers stay integers on the wire ("7", not "7.0").
fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

/// A case-insensitive label (or value) match, else a 1-based position.
/// Labels win so options labelled with numbers stay reachable by label.
fn resolve_option<'a>(options: &'a [ChoiceOption], answer: &str) -> Option<&'a ChoiceOption> {
    let answer = normalize_word(answer);
    if answer.is_empty() {
        return None;
    }
    options
        .iter()
        .find(|o| o.label.to_lowercase() == answer)
        .or_else(|| options.iter().find(|o| o.value.to_lowercase() == answer))
        .or_else(|| {
            answer
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|i| options.get(i))
        })
}

fn parse_multiple(options: &[ChoiceOption], trimmed: &str) -> Value {
    if let Some(option) = resolve_option(options, trimmed) {
        return Value::Array(vec![Value::String(option.value.clone())]);
    }

    let mut values: Vec<Value> = Vec::new();
    for item in ITEM_SEPARATOR.split(trimmed).filter(|p| !p.trim().is_empty()) {
        // A whole item may be a label containing "and".
        let resolved: Option<Vec<&ChoiceOption>> = match resolve_option(options, item) {
            Some(option) => Some(vec![option]),
            None => AND_SEPARATOR
                .split(item)
                .filter(|p| !p.trim().is_empty())
                .map(|part| resolve_option(options, part))
                .collect(),
        };
        let Some(resolved) = resolved else {
            return Value::String(trimmed.to_string());
        };
        for option in resolved {
            let value = Value::String(option.value.clone());
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    if values.is_empty() {
        Value::String(trimmed.to_string())
    } else {
        Value::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(question_type: QuestionType) -> ConversationalStep {
        ConversationalStep {
            id: "s/q".to_string(),
            position: 1,
            section_id: "s".to_string(),
            section_name: "Section".to_string(),
            question_id: "q".to_string(),
            text: "Question".to_string(),
            question_type,
            required: true,
            options: vec![
                ChoiceOption { label: "Walking".into(), value: "walking".into() },
                ChoiceOption { label: "Stairs".into(), value: "stairs".into() },
                ChoiceOption { label: "Getting out of bed".into(), value: "bed".into() },
            ],
            validation_rules: None,
            help_text: None,
            medical_definition: None,
            next_step_id: None,
            conditional_next: Vec::new(),
        }
    }

    #[test]
    fn yes_no_synonyms() {
        let s = step(QuestionType::YesNo);
        assert_eq!(parse_input(&s, "Yep"), json!("yes"));
        assert_eq!(parse_input(&s, " OKAY "), json!("yes"));
        assert_eq!(parse_input(&s, "Nope."), json!("no"));
        assert_eq!(parse_input(&s, "false"), json!("no"));
        assert_eq!(parse_input(&s, "maybe"), json!("maybe"));
    }

    #[test]
    fn numbers_take_first_match() {
        let s = step(QuestionType::PainScale);
        assert_eq!(parse_input(&s, "about a 7 today, maybe 8"), json!(7));
        assert_eq!(parse_input(&s, "-1"), json!(-1));
        assert_eq!(parse_input(&s, "99.5 F"), json!(99.5));
        assert_eq!(parse_input(&s, "it hurts"), json!("it hurts"));
    }

    #[test]
    fn spoken_numbers() {
        let s = step(QuestionType::Scale);
        assert_eq!(parse_input(&s, "Four."), json!(4));
        assert_eq!(parse_input(&s, "I'd say ten"), json!(10));
        assert_eq!(parse_input(&s, "someone"), json!("someone"));
    }

    #[test]
    fn single_choice_by_index_or_label() {
        let s = step(QuestionType::SingleChoice);
        assert_eq!(parse_input(&s, "2"), json!("stairs"));
        assert_eq!(parse_input(&s, "getting OUT of bed"), json!("bed"));
        assert_eq!(parse_input(&s, "4"), json!("4"));
        assert_eq!(parse_input(&s, "0"), json!("0"));
        assert_eq!(parse_input(&s, "running"), json!("running"));
    }

    #[test]
    fn multiple_choice_lists() {
        let s = step(QuestionType::MultipleChoice);
        assert_eq!(parse_input(&s, "1, 3"), json!(["walking", "bed"]));
        assert_eq!(parse_input(&s, "stairs and walking"), json!(["stairs", "walking"]));
        assert_eq!(parse_input(&s, "2, 2"), json!(["stairs"]));
        assert_eq!(parse_input(&s, "Walking"), json!(["walking"]));
        assert_eq!(parse_input(&s, "1, swimming"), json!("1, swimming"));
    }

    #[test]
    fn other_types_are_trimmed_strings() {
        assert_eq!(parse_input(&step(QuestionType::Date), " 04/02/2026 "), json!("04/02/2026"));
        assert_eq!(parse_input(&step(QuestionType::Text), "  sore  "), json!("sore"));
        assert_eq!(parse_input(&step(QuestionType::Email), ""), json!(""));
    }

    fn options_step(question_type: QuestionType, options: &[(&str, &str)]) -> ConversationalStep {
        ConversationalStep {
            options: options
                .iter()
                .map(|(label, value)| ChoiceOption { label: label.to_string(), value: value.to_string() })
                .collect(),
            ..step(question_type)
        }
    }

    #[test]
    fn numeric_labels_match_before_positions() {
        let s = options_step(
            QuestionType::SingleChoice,
            &[("5", "five_minutes"), ("10", "ten_minutes"), ("30", "thirty_minutes")],
        );
        assert_eq!(parse_input(&s, "10"), json!("ten_minutes"));
        assert_eq!(parse_input(&s, "30."), json!("thirty_minutes"));
        // Not a label, so it falls back to the position.
        assert_eq!(parse_input(&s, "2"), json!("ten_minutes"));
        assert_eq!(parse_input(&s, "7"), json!("7"));
    }

    #[test]
    fn multiple_choice_keeps_labels_containing_and() {
        let s = options_step(
            QuestionType::MultipleChoice,
            &[("Pain and swelling", "pain_swelling"), ("Fever", "fever"), ("Redness", "redness")],
        );
        assert_eq!(parse_input(&s, "Pain and swelling, fever"), json!(["pain_swelling", "fever"]));
        assert_eq!(parse_input(&s, "fever and redness"), json!(["fever", "redness"]));
        assert_eq!(parse_input(&s, "pain and swelling"), json!(["pain_swelling"]));
        assert_eq!(parse_input(&s, "fever and chills"), json!("fever and chills"));
    }
}
