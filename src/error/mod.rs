//! This module defines the errors surfaced by the live-results pipeline.
//!
//! Only fetch-layer failures and setup problems are errors. A tally that references an unknown party,
//! an expected-voter baseline of zero and results that arrive after teardown are all handled in place
//! and never show up here.

use std::fmt::Display;

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Error enum with all possible variants
#[derive(Debug, Serialize)]
pub enum Error {
    /// Either the tallies request or the parties request failed (network or decode)
    Fetch(crate::client::error::Error),
    InvalidConfig {
        reason: String,
    },
    InvalidLocale {
        got: String,
    },
    Io {
        reason: String,
    },
    Logic {
        reason: String,
    },
}

impl Error {
    /// Returns true if this is an instance of a [`Error::Fetch`] variant
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<crate::client::error::Error> for Error {
    fn from(err: crate::client::error::Error) -> Self {
        Self::Fetch(err)
    }
}
