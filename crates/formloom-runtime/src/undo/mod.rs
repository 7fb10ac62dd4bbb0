#![forbid(unsafe_code)]

//! Undo/redo over committed form states.
//!
//! Only committed edits become history entries. Hover previews, selection
//! changes and page navigation overwrite the present without a step.

pub mod history;

pub use history::{DEFAULT_MAX_DEPTH, History};
