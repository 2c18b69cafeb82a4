//! recovery-storage
//!
//! The task/form store and completion record contracts, with an in-memory
//! implementation and a JSON document store on the local filesystem.
//! Progress writes use compare-and-swap on a version token so concurrent
//! turns on the same form instance cannot silently overwrite each other.

pub mod error;
pub mod file;
pub mod memory;
pub mod objects;
pub mod state;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{CompletionRecordSource, TaskFormStore, Version};
