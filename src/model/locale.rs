//! The UI languages the results view can render in.
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Error;

/// A supported display language. The lowercase code doubles as the key into a party's `translations` map.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Hi,
    Mr,
}

impl Locale {
    pub fn code(&self) -> &str {
        self.as_ref()
    }

    /// Parses a locale code, reporting unknown codes as [`Error::InvalidLocale`]
    pub fn parse(code: &str) -> crate::error::Result<Self> {
        code.trim()
            .to_lowercase()
            .parse::<Locale>()
            .map_err(|_| Error::InvalidLocale {
                got: code.to_string(),
            })
    }
}
