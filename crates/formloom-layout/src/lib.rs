#![forbid(unsafe_code)]

//! Layout: the component tree and everything that edits it.
//!
//! # Role in Formloom
//! `formloom-layout` owns the document model. A form is a list of pages, each
//! holding a [`ComponentTree`] of fields and groups. All edits go through
//! [`ComponentTree::apply`] (or [`FormState::apply`] for the current page),
//! which returns a new value and leaves the old one untouched.
//!
//! # Structural rules
//! - component ids are unique across the whole form
//! - leaves never own children
//! - a horizontal group holds between two and four children
//! - no horizontal group sits anywhere below another horizontal group
//!
//! The [`constraints`] module rewrites raw drop intents so that ordinary
//! gestures land somewhere legal; the engine rejects whatever still breaks a
//! rule.

pub mod component;
pub mod constraints;
pub mod engine;
pub mod factory;
pub mod form;
pub mod patch;
pub mod snapshot;
pub mod tree;
pub mod validate;

pub use component::{
    Alignment, Attribute, ChoiceOption, Component, ComponentId, ComponentKind, FieldProps,
    LayoutHints, MAX_GROUP_CHILDREN, MIN_GROUP_CHILDREN, ValidationRule, WidthHint,
};
pub use constraints::{
    DraggedItem, DropContext, DropPlacement, RowContext, TargetContext, resolve, resolve_in,
};
pub use engine::{
    Dissolution, OperationError, OperationFailure, OperationKind, OperationOutcome,
    TreeOperation, add_component, drop_operation, move_component, remove_component,
    update_component,
};
pub use factory::{ComponentFactory, DEFAULT_ID_PREFIX, MAX_SEQUENCE};
pub use form::{FormState, Page, PageError, PageId};
pub use patch::{ComponentPatch, PatchReport};
pub use snapshot::{FormLoadError, SCHEMA_VERSION};
pub use tree::{ComponentTree, InvariantViolation};
pub use validate::{IssueCode, ValidationIssue, ValidationReport, validate, validate_form};
