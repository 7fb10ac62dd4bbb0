#![forbid(unsafe_code)]

//! Formloom public facade.
//!
//! Re-exports the common types of the internal crates and offers a prelude
//! for day-to-day use.
//!
//! ```rust,ignore
//! use formloom::prelude::*;
//!
//! let mut builder = FormBuilder::new();
//! builder.add_component(ComponentKind::TextInput, None, DropIntent::After);
//! let json = builder.to_json()?;
//! ```

pub mod error;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use formloom_core::{
    CooldownGate, DropIntent, GateDecision, PlacementThresholds, Point, Rect, Size, classify,
    indicator_rect,
};

// --- Layout re-exports -----------------------------------------------------

pub use formloom_layout::{
    ChoiceOption, Component, ComponentFactory, ComponentId, ComponentKind, ComponentPatch,
    ComponentTree, DraggedItem, DropPlacement, FieldProps, FormLoadError, FormState,
    LayoutHints, OperationError, OperationFailure, OperationOutcome, Page, PageError, PageId,
    SCHEMA_VERSION, TreeOperation, ValidationReport, ValidationRule, resolve_in, validate_form,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use formloom_runtime::{
    BuilderConfig, ConfigError, DragSource, DropPreview, DropSite, FormBuilder, History,
    Observable, Subscription,
};

/// Build an editor for `document` using `config`.
#[cfg(feature = "runtime")]
pub fn open(config: BuilderConfig, document: &str) -> Result<FormBuilder> {
    let mut builder = FormBuilder::with_config(config)?;
    builder.load_json(document)?;
    Ok(builder)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ComponentId, ComponentKind, ComponentPatch, DropIntent, Error, FormState, PageId, Point,
        Result, Size,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{BuilderConfig, DragSource, DropSite, FormBuilder};

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use formloom_core as core;
pub use formloom_layout as layout;
#[cfg(feature = "runtime")]
pub use formloom_runtime as runtime;
