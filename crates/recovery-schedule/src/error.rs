use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Callers control the day range, so this indicates a programming error.
    #[error("day {day} is outside the timeline [{start}, {end}]")]
    OutOfRangeDay { day: i32, start: i32, end: i32 },

    #[error("timeline already contains a task with id '{0}'")]
    DuplicateTask(String),

    #[error("no task with id '{0}' in the timeline")]
    UnknownTask(String),

    #[error(transparent)]
    InvalidDefinition(#[from] recovery_core::error::CoreError),

    #[error("calendar arithmetic failed: {0}")]
    Calendar(#[from] jiff::Error),
}
