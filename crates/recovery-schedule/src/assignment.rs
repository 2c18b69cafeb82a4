use recovery_core::models::completion::CompletionRecords;
use recovery_core::models::task::TaskDefinition;
use serde::Serialize;

use crate::error::ScheduleError;
use crate::frequency;
use crate::timeline::ProtocolTimeline;

/// A patient's tasks for one protocol day, split into disjoint buckets.
/// Each bucket keeps authoring order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentView {
    pub day: i32,
    pub day_label: String,
    pub due_today: Vec<TaskDefinition>,
    pub upcoming: Vec<TaskDefinition>,
    pub completed: Vec<TaskDefinition>,
}

impl AssignmentView {
    /// Share of required tasks completed so far, 0–100.
    pub fn required_completion_percentage(&self) -> u32 {
        let count = |tasks: &[TaskDefinition]| tasks.iter().filter(|t| t.required).count();
        let done = count(&self.completed);
        let total = done + count(&self.due_today) + count(&self.upcoming);
        if total == 0 {
            return 100;
        }
        ((done as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Partition the timeline's tasks for `day` using the patient's completion
/// records.
///
/// A completed task lands in `completed` only. Otherwise it is due today when
/// its rule is active on `day`, or upcoming when it has an active day later
/// in the timeline. Tasks whose last occurrence has passed without a
/// completion record appear in no bucket.
pub fn classify(
    timeline: &ProtocolTimeline,
    records: &CompletionRecords,
    day: i32,
) -> Result<AssignmentView, ScheduleError> {
    timeline.ensure_in_range(day)?;

    let mut view = AssignmentView {
        day,
        day_label: ProtocolTimeline::day_label(day),
        due_today: Vec::new(),
        upcoming: Vec::new(),
        completed: Vec::new(),
    };

    for task in timeline.tasks() {
        let done = records.get(&task.id).is_some_and(|r| r.is_completed());
        if done {
            view.completed.push(task.clone());
        } else if frequency::is_active_on(&task.schedule, day) {
            view.due_today.push(task.clone());
        } else if frequency::next_active_day(&task.schedule, day, timeline.timeline_end()).is_some()
        {
            view.upcoming.push(task.clone());
        }
    }

    tracing::debug!(
        day,
        due_today = view.due_today.len(),
        upcoming = view.upcoming.len(),
        completed = view.completed.len(),
        "classified protocol tasks"
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use recovery_core::models::completion::CompletionRecord;
    use recovery_core::models::progress::ProgressStatus;
    use recovery_core::models::schedule::{FrequencyRule, RepeatKind};
    use recovery_core::models::task::TaskKind;

    fn task(id: &str, schedule: FrequencyRule) -> TaskDefinition {
        TaskDefinition {
            id: id.to_string(),
            kind: TaskKind::Exercise,
            title: id.to_string(),
            content: String::new(),
            required: true,
            schedule,
            form_ref: None,
            adjusted_from_original: false,
        }
    }

    fn record(task_id: &str, status: ProgressStatus) -> (String, CompletionRecord) {
        (
            task_id.to_string(),
            CompletionRecord {
                task_id: task_id.to_string(),
                status,
                completed_at: (status == ProgressStatus::Completed)
                    .then(|| "2026-04-01T12:00:00Z".parse().unwrap()),
            },
        )
    }

    fn timeline() -> ProtocolTimeline {
        ProtocolTimeline::new(
            -3,
            21,
            vec![
                task("consent", FrequencyRule::once(-3)),
                task("walk", FrequencyRule::repeating(0, 21, RepeatKind::Daily)),
                task("stretch", FrequencyRule::repeating(1, 21, RepeatKind::EveryOtherDay)),
                task("video", FrequencyRule::once(4)),
                task("follow-up", FrequencyRule::once(14)),
                task("survey", FrequencyRule::once(2)),
            ],
        )
        .unwrap()
    }

    fn ids(tasks: &[TaskDefinition]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn partitions_by_day_and_completion() {
        let records: CompletionRecords = [
            record("video", ProgressStatus::Completed),
            record("walk", ProgressStatus::InProgress),
        ]
        .into_iter()
        .collect();

        let view = classify(&timeline(), &records, 3).unwrap();
        assert_eq!(view.day_label, "Post-Op 3");
        assert_eq!(ids(&view.due_today), vec!["walk", "stretch"]);
        assert_eq!(ids(&view.upcoming), vec!["follow-up"]);
        assert_eq!(ids(&view.completed), vec!["video"]);
    }

    #[test]
    fn buckets_are_disjoint_for_every_day() {
        let t = timeline();
        let records: CompletionRecords = [record("stretch", ProgressStatus::Completed)]
            .into_iter()
            .collect();

        for day in t.timeline_start()..=t.timeline_end() {
            let view = classify(&t, &records, day).unwrap();
            let mut seen = HashSet::new();
            for task in view.due_today.iter().chain(&view.upcoming).chain(&view.completed) {
                assert!(seen.insert(task.id.clone()), "{} repeated on day {day}", task.id);
            }
            for task in t.tasks() {
                let active = frequency::is_active_on(&task.schedule, day);
                if active && !records.contains_key(&task.id) {
                    assert!(view.due_today.contains(task), "{} missing on day {day}", task.id);
                }
            }
        }
    }

    #[test]
    fn out_of_range_day_is_rejected() {
        let err = classify(&timeline(), &CompletionRecords::new(), 22).unwrap_err();
        assert!(matches!(err, ScheduleError::OutOfRangeDay { day: 22, .. }));
    }

    #[test]
    fn required_completion_percentage_counts_only_required_tasks() {
        let records: CompletionRecords = [
            record("consent", ProgressStatus::Completed),
            record("survey", ProgressStatus::Completed),
        ]
        .into_iter()
        .collect();
        let view = classify(&timeline(), &records, 2).unwrap();
        // stretch runs on odd days, so on day 2 it is only upcoming
        assert_eq!(ids(&view.due_today), vec!["walk"]);
        assert_eq!(ids(&view.upcoming), vec!["stretch", "video", "follow-up"]);
        assert_eq!(view.required_completion_percentage(), 33);
    }
}
