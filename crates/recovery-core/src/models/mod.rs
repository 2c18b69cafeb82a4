pub mod completion;
pub mod conversation;
pub mod form;
pub mod progress;
pub mod schedule;
pub mod task;
