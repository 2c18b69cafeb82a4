use jiff::civil::Date;
use jiff::Span;
use recovery_core::models::task::{Protocol, TaskDefinition, TaskKind};

use crate::error::ScheduleError;
use crate::frequency;

/// An ordered set of task definitions over an inclusive day range.
///
/// Edits return a new timeline and leave the receiver untouched, so a
/// timeline handed to a patient assignment never changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolTimeline {
    timeline_start: i32,
    timeline_end: i32,
    tasks: Vec<TaskDefinition>,
}

/// A form task together with the first day it is due inside a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormWindowEntry<'a> {
    pub task: &'a TaskDefinition,
    pub first_day: i32,
}

impl ProtocolTimeline {
    pub fn new(
        timeline_start: i32,
        timeline_end: i32,
        tasks: Vec<TaskDefinition>,
    ) -> Result<Self, ScheduleError> {
        let protocol = Protocol {
            id: String::new(),
            name: String::new(),
            timeline_start,
            timeline_end,
            tasks,
        };
        protocol.check()?;
        Ok(Self {
            timeline_start,
            timeline_end,
            tasks: protocol.tasks,
        })
    }

    pub fn from_protocol(protocol: &Protocol) -> Result<Self, ScheduleError> {
        protocol.check()?;
        Ok(Self {
            timeline_start: protocol.timeline_start,
            timeline_end: protocol.timeline_end,
            tasks: protocol.tasks.clone(),
        })
    }

    /// Package the timeline back into a protocol for persisting.
    pub fn to_protocol(&self, id: &str, name: &str) -> Protocol {
        Protocol {
            id: id.to_string(),
            name: name.to_string(),
            timeline_start: self.timeline_start,
            timeline_end: self.timeline_end,
            tasks: self.tasks.clone(),
        }
    }

    pub fn timeline_start(&self) -> i32 {
        self.timeline_start
    }

    pub fn timeline_end(&self) -> i32 {
        self.timeline_end
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains_day(&self, day: i32) -> bool {
        (self.timeline_start..=self.timeline_end).contains(&day)
    }

    pub(crate) fn ensure_in_range(&self, day: i32) -> Result<(), ScheduleError> {
        if self.contains_day(day) {
            Ok(())
        } else {
            Err(ScheduleError::OutOfRangeDay {
                day,
                start: self.timeline_start,
                end: self.timeline_end,
            })
        }
    }

    /// Tasks due on `day`, in authoring order.
    pub fn tasks_for_day(&self, day: i32) -> Result<Vec<&TaskDefinition>, ScheduleError> {
        self.ensure_in_range(day)?;
        Ok(frequency::tasks_for_day(&self.tasks, day))
    }

    /// Every day of the timeline with at least one task, ascending.
    pub fn days_with_tasks(&self) -> Vec<i32> {
        (self.timeline_start..=self.timeline_end)
            .filter(|&day| {
                self.tasks
                    .iter()
                    .any(|t| frequency::is_active_on(&t.schedule, day))
            })
            .collect()
    }

    /// Form tasks active anywhere in `[from, to]`, with the first day each is
    /// due, in authoring order.
    pub fn forms_in_window(
        &self,
        from: i32,
        to: i32,
    ) -> Result<Vec<FormWindowEntry<'_>>, ScheduleError> {
        self.ensure_in_range(from)?;
        self.ensure_in_range(to)?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Form)
            .filter_map(|task| {
                frequency::next_active_day(&task.schedule, from - 1, to)
                    .map(|first_day| FormWindowEntry { task, first_day })
            })
            .collect())
    }

    /// Human label for a protocol day relative to surgery.
    pub fn day_label(day: i32) -> String {
        match day {
            0 => "Surgery".to_string(),
            d if d < 0 => format!("Pre-Op {}", d.unsigned_abs()),
            d => format!("Post-Op {d}"),
        }
    }

    /// Calendar date of protocol day `day` given the anchor (surgery) date.
    pub fn date_for_day(anchor: Date, day: i32) -> Result<Date, ScheduleError> {
        Ok(anchor.checked_add(Span::new().try_days(day)?)?)
    }

    /// Protocol day of `date` given the anchor (surgery) date.
    pub fn day_for_date(anchor: Date, date: Date) -> Result<i32, ScheduleError> {
        Ok(anchor.until(date)?.get_days())
    }

    pub fn add_task(&self, task: TaskDefinition) -> Result<Self, ScheduleError> {
        if self.task(&task.id).is_some() {
            return Err(ScheduleError::DuplicateTask(task.id));
        }
        task.check()?;

        let mut next = self.clone();
        next.tasks.push(task);
        Ok(next)
    }

    /// Replace the task with the same id. The replacement is flagged as
    /// adjusted from the original and keeps its authoring position.
    pub fn update_task(&self, task: TaskDefinition) -> Result<Self, ScheduleError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == task.id)
            .ok_or_else(|| ScheduleError::UnknownTask(task.id.clone()))?;
        task.check()?;

        let mut next = self.clone();
        next.tasks[index] = TaskDefinition {
            adjusted_from_original: true,
            ..task
        };
        Ok(next)
    }

    pub fn remove_task(&self, id: &str) -> Result<Self, ScheduleError> {
        if self.task(id).is_none() {
            return Err(ScheduleError::UnknownTask(id.to_string()));
        }
        let mut next = self.clone();
        next.tasks.retain(|t| t.id != id);
        Ok(next)
    }
}
