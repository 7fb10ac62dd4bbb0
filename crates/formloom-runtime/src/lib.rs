#![forbid(unsafe_code)]

//! Runtime: stateful services around the immutable form model.
//!
//! # Role in Formloom
//! `formloom-runtime` is where state lives. [`FormBuilder`] holds the
//! committed [`FormState`](formloom_layout::FormState), records undo steps
//! in a [`History`], publishes changes through an [`Observable`], and runs
//! drag gestures through a [`DragSession`].
//!
//! # How it fits in the system
//! Everything here is single-threaded and synchronous. Time enters only
//! through the add cooldown, and every time-dependent command has an `_at`
//! variant that takes the clock reading explicitly.

pub mod builder;
pub mod config;
pub mod drag;
pub mod reactive;
pub mod undo;

pub use builder::FormBuilder;
pub use config::{BuilderConfig, ConfigError, HistoryConfig};
pub use drag::{DragOrigin, DragPhase, DragSession, DragSource, DropCommand, DropPreview, DropSite};
pub use reactive::{Observable, Subscription};
pub use undo::{DEFAULT_MAX_DEPTH, History};
