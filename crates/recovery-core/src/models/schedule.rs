use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// How a repeating rule recurs between its start and stop day.
///
/// Serialized as a plain string. Kinds this build does not know survive a
/// round trip as [`RepeatKind::Unrecognized`] so that a newer authoring tool
/// cannot make a stored protocol unreadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepeatKind {
    #[default]
    Daily,
    EveryOtherDay,
    Weekly,
    Biweekly,
    /// Fixed 30-day period, not calendar months.
    Monthly,
    /// Every `interval` days.
    Custom,
    Unrecognized(String),
}

impl RepeatKind {
    pub fn as_str(&self) -> &str {
        match self {
            RepeatKind::Daily => "daily",
            RepeatKind::EveryOtherDay => "every_other_day",
            RepeatKind::Weekly => "weekly",
            RepeatKind::Biweekly => "biweekly",
            RepeatKind::Monthly => "monthly",
            RepeatKind::Custom => "custom",
            RepeatKind::Unrecognized(kind) => kind,
        }
    }
}

impl From<String> for RepeatKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "daily" => RepeatKind::Daily,
            "every_other_day" | "everyOtherDay" => RepeatKind::EveryOtherDay,
            "weekly" => RepeatKind::Weekly,
            "biweekly" => RepeatKind::Biweekly,
            "monthly" => RepeatKind::Monthly,
            "custom" => RepeatKind::Custom,
            _ => RepeatKind::Unrecognized(value),
        }
    }
}

impl From<RepeatKind> for String {
    fn from(kind: RepeatKind) -> Self {
        match kind {
            RepeatKind::Unrecognized(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

/// When a task is active on the protocol's day axis.
///
/// Day 0 is the anchor event (usually surgery); negative days are pre-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FrequencyRule {
    pub start_day: i32,
    /// Inclusive. Ignored unless `repeat` is set.
    #[serde(default)]
    pub stop_day: i32,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    #[ts(type = "string")]
    pub repeat_kind: RepeatKind,
    /// Days between occurrences; only read for [`RepeatKind::Custom`].
    #[serde(default = "default_interval")]
    pub interval: u32,
}

fn default_interval() -> u32 {
    1
}

impl FrequencyRule {
    /// A rule active on exactly one day.
    pub fn once(day: i32) -> Self {
        Self {
            start_day: day,
            stop_day: day,
            repeat: false,
            repeat_kind: RepeatKind::Daily,
            interval: 1,
        }
    }

    pub fn repeating(start_day: i32, stop_day: i32, repeat_kind: RepeatKind) -> Self {
        Self {
            start_day,
            stop_day,
            repeat: true,
            repeat_kind,
            interval: 1,
        }
    }

    /// A custom rule firing every `interval` days from `start_day`.
    pub fn every(start_day: i32, stop_day: i32, interval: u32) -> Self {
        Self {
            start_day,
            stop_day,
            repeat: true,
            repeat_kind: RepeatKind::Custom,
            interval,
        }
    }

    /// Last day the rule can be active on.
    pub fn effective_stop_day(&self) -> i32 {
        if self.repeat {
            self.stop_day
        } else {
            self.start_day
        }
    }

    /// Structural check applied when a rule enters a protocol.
    pub fn check(&self) -> Result<(), CoreError> {
        if !self.repeat {
            return Ok(());
        }
        if self.stop_day < self.start_day {
            return Err(CoreError::InvalidRule(format!(
                "stop_day {} is before start_day {}",
                self.stop_day, self.start_day
            )));
        }
        if self.repeat_kind == RepeatKind::Custom && self.interval == 0 {
            return Err(CoreError::InvalidRule(
                "custom rules need an interval of at least 1 day".to_string(),
            ));
        }
        Ok(())
    }
}
