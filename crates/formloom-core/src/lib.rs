#![forbid(unsafe_code)]

//! Core: pointer geometry, drop-intent classification, and input gating.
//!
//! # Role in Formloom
//! `formloom-core` is the dependency-free bottom layer. It turns already
//! measured pointer offsets into [`DropIntent`]s and provides the cooldown
//! gate used to coalesce duplicate add requests.
//!
//! # How it fits in the system
//! `formloom-layout` consumes [`DropIntent`] when it rewrites intents into
//! legal tree placements; `formloom-runtime` drives [`classify`] on every
//! hover tick of a drag gesture.

pub mod geometry;
pub mod logging;
pub mod placement;
pub mod throttle;

pub use geometry::{Point, Rect, Size};
pub use placement::{
    DEFAULT_HORIZONTAL_THRESHOLD, DEFAULT_VERTICAL_THRESHOLD, DropIntent, PlacementThresholds,
    classify, indicator_rect,
};
pub use throttle::{CooldownGate, DEFAULT_ADD_COOLDOWN, GateDecision};
