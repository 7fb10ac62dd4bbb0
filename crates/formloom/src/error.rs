#![forbid(unsafe_code)]

//! Top-level error for Formloom hosts.
//!
//! Ordinary editing never fails: refused gestures leave the state unchanged.
//! What remains are the things a host has to report to a person: a document
//! that will not load, a config that does not validate, a page that does not
//! exist.

use std::fmt;

use formloom_layout::{FormLoadError, PageError};
#[cfg(feature = "runtime")]
use formloom_runtime::ConfigError;

#[derive(Debug)]
pub enum Error {
    /// A form document was refused.
    Load(FormLoadError),
    /// Builder configuration could not be read or did not validate.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
    /// A page command named a page that cannot take it.
    Page(PageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
            Self::Page(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
            Self::Page(err) => Some(err),
        }
    }
}

impl From<FormLoadError> for Error {
    fn from(err: FormLoadError) -> Self {
        Self::Load(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PageError> for Error {
    fn from(err: PageError) -> Self {
        Self::Page(err)
    }
}

/// Standard result type for Formloom APIs.
pub type Result<T> = std::result::Result<T, Error>;
