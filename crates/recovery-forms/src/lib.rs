//! recovery-forms
//!
//! Conversational form delivery. Compiles form definitions into a linear
//! question-per-turn flow, renders prompts, parses and validates free-text or
//! transcribed-voice answers, and tracks a patient's progress through the
//! flow. Pure data in, pure data out. No transport or storage dependency.

pub mod compiler;
pub mod error;
pub mod intent;
pub mod library;
pub mod parse;
pub mod progress;
pub mod prompt;
pub mod validate;

pub use compiler::compile;
pub use parse::parse_input;
pub use progress::{completion_percentage, FormSession, Turn, TurnAction};
pub use prompt::render_prompt;
pub use validate::{validate, ValidationResult};
