use serde::{Deserialize, Serialize};

/// Concrete type for a [`crate::client::ResultsClient`] error
pub type Result<T> = std::result::Result<T, Error>;

/// Enum that represents a [`crate::client::ResultsClient`] error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// Variant returned when the backend could not be reached at all
    UnableToConnect { reason: String },
    /// The request did not complete within the configured timeout
    Timeout { reason: String },
    /// Backend answered with a non-2xx status. `reason` is the backend's `error` field when it sent one
    Http { status: u16, reason: String },
    /// Variant returned if the client was unable to interpret the server response
    InvalidServerResponse { reason: String },
    /// Generic IO error (automatically converted from [`std::io::Error`])
    Io { reason: String },
    /// Anything reqwest reports that doesn't fit the variants above
    Generic { reason: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io {
            reason: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidServerResponse {
            reason: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        let reason = value.to_string();
        if value.is_timeout() {
            Self::Timeout { reason }
        } else if value.is_connect() {
            Self::UnableToConnect { reason }
        } else if value.is_decode() {
            Self::InvalidServerResponse { reason }
        } else if let Some(status) = value.status() {
            Self::Http {
                status: status.as_u16(),
                reason,
            }
        } else {
            Self::Generic { reason }
        }
    }
}
