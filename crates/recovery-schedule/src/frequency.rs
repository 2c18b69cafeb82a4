use recovery_core::models::schedule::{FrequencyRule, RepeatKind};
use recovery_core::models::task::TaskDefinition;
use tracing::warn;

/// Monthly rules use a fixed period rather than calendar months.
pub const MONTHLY_PERIOD_DAYS: i32 = 30;

/// Whether `rule` makes its task active on protocol day `day`.
pub fn is_active_on(rule: &FrequencyRule, day: i32) -> bool {
    if !rule.repeat {
        return day == rule.start_day;
    }
    if day < rule.start_day || day > rule.stop_day {
        return false;
    }

    // Widened: the span between two extreme days does not fit in an i32.
    let delta = i64::from(day) - i64::from(rule.start_day);
    match &rule.repeat_kind {
        RepeatKind::Daily => true,
        RepeatKind::EveryOtherDay => delta % 2 == 0,
        RepeatKind::Weekly => delta % 7 == 0,
        RepeatKind::Biweekly => delta % 14 == 0,
        RepeatKind::Monthly => delta % i64::from(MONTHLY_PERIOD_DAYS) == 0,
        RepeatKind::Custom => delta % i64::from(rule.interval.max(1)) == 0,
        RepeatKind::Unrecognized(kind) => {
            warn!(repeat_kind = %kind, "unrecognized repeat kind, treating as daily");
            true
        }
    }
}

/// Tasks active on `day`, in authoring order.
pub fn tasks_for_day(tasks: &[TaskDefinition], day: i32) -> Vec<&TaskDefinition> {
    tasks
        .iter()
        .filter(|t| is_active_on(&t.schedule, day))
        .collect()
}

/// Every day in `[from, to]` on which `rule` is active, ascending.
pub fn active_days(rule: &FrequencyRule, from: i32, to: i32) -> Vec<i32> {
    let lo = from.max(rule.start_day);
    let hi = to.min(rule.effective_stop_day());
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).filter(|&d| is_active_on(rule, d)).collect()
}

/// Earliest day strictly after `after` and no later than `limit` on which
/// `rule` is active.
pub fn next_active_day(rule: &FrequencyRule, after: i32, limit: i32) -> Option<i32> {
    let lo = after.saturating_add(1).max(rule.start_day);
    let hi = limit.min(rule.effective_stop_day());
    (lo..=hi).find(|&d| is_active_on(rule, d))
}
