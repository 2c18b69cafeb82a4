//! recovery-schedule
//!
//! Day projection for protocol tasks. Pure computation: decides which tasks
//! are active on a protocol day, answers timeline queries, and partitions a
//! patient's tasks into due today / upcoming / completed.

pub mod assignment;
pub mod error;
pub mod frequency;
pub mod timeline;

pub use assignment::{classify, AssignmentView};
pub use frequency::{is_active_on, tasks_for_day};
pub use timeline::ProtocolTimeline;
