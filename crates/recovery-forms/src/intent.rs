//! Control phrases a patient can send instead of an answer.
//!
//! Checked before an input is parsed as an answer, and matched against the
//! whole message only, so "stop" is a pause but "the pain will not stop" is an
//! answer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

const SKIP_PHRASES: &[&str] = &[
    "skip",
    "skip it",
    "skip this",
    "skip this one",
    "skip question",
    "skip this question",
    "pass",
    "next",
    "next question",
    "move on",
];

const BACK_PHRASES: &[&str] = &[
    "back",
    "go back",
    "previous",
    "previous question",
    "last question",
    "undo",
];

const PAUSE_PHRASES: &[&str] = &[
    "pause",
    "stop",
    "save",
    "save for later",
    "continue later",
    "finish later",
    "later",
    "i'm done",
    "im done",
    "done",
    "finish",
    "quit",
    "exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Intent {
    Skip,
    Back,
    Pause,
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase()
        .replace('’', "'")
}

fn matches_any(raw: &str, phrases: &[&str]) -> bool {
    let normalized = normalize(raw);
    phrases.contains(&normalized.as_str())
}

pub fn is_skip_intent(raw: &str) -> bool {
    matches_any(raw, SKIP_PHRASES)
}

pub fn is_back_intent(raw: &str) -> bool {
    matches_any(raw, BACK_PHRASES)
}

pub fn is_pause_intent(raw: &str) -> bool {
    matches_any(raw, PAUSE_PHRASES)
}

/// Classify a message as a control intent, or `None` if it should be treated
/// as an answer.
pub fn classify_intent(raw: &str) -> Option<Intent> {
    if is_skip_intent(raw) {
        Some(Intent::Skip)
    } else if is_back_intent(raw) {
        Some(Intent::Back)
    } else if is_pause_intent(raw) {
        Some(Intent::Pause)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_whole_phrases_only() {
        assert_eq!(classify_intent("Skip"), Some(Intent::Skip));
        assert_eq!(classify_intent("  next question. "), Some(Intent::Skip));
        assert_eq!(classify_intent("Go back!"), Some(Intent::Back));
        assert_eq!(classify_intent("I’m done"), Some(Intent::Pause));
        assert_eq!(classify_intent("save for later"), Some(Intent::Pause));

        assert_eq!(classify_intent("the pain will not stop"), None);
        assert_eq!(classify_intent("my back hurts"), None);
        assert_eq!(classify_intent("yes"), None);
        assert_eq!(classify_intent(""), None);
    }

    #[test]
    fn predicates_agree_with_classification() {
        assert!(is_skip_intent("pass"));
        assert!(is_back_intent("previous"));
        assert!(is_pause_intent("STOP"));
        assert!(!is_pause_intent("skip"));
    }
}
