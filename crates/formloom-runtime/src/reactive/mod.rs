#![forbid(unsafe_code)]

//! Change notification for the committed form state.

pub mod observable;

pub use observable::{Observable, Subscription};
