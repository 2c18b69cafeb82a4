//! recovery-core
//!
//! Pure domain types and store key conventions.
//! No storage or transport dependency; this is the shared vocabulary of the
//! recovery tracking system.

pub mod error;
pub mod models;
pub mod store_keys;
