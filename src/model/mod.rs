//! Records read from the results backend.
//!
//! These types mirror the JSON shapes of `GET /votes/results` and `GET /parties`. They are owned by the
//! backend and only ever read here. Deserialization is lenient in the same places the backend is loose:
//! party ids may come as `id` or `_id`, missing counts are zero and `/parties` may or may not wrap
//! its array in an object.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod locale;

pub use locale::Locale;

/// Symbol shown when neither the party nor the tally carries one
pub const DEFAULT_SYMBOL: &str = "📋";
/// Neutral color used for parties the catalog doesn't know about
pub const DEFAULT_COLOR: &str = "#6B7280";
/// Display name used when a tally references an unknown party and carries no name of its own
pub const UNKNOWN_PARTY: &str = "Unknown Party";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    #[default]
    Active,
    Inactive,
}

/// Per-locale overrides for a party's display strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTranslation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The localizable text fields of a [`Party`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyField {
    Name,
    Leader,
    Description,
}

impl PartyTranslation {
    fn get(&self, field: PartyField) -> Option<&str> {
        let value = match field {
            PartyField::Name => self.name.as_deref(),
            PartyField::Leader => self.leader.as_deref(),
            PartyField::Description => self.description.as_deref(),
        };

        value.filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub status: PartyStatus,
    /// keyed by locale code, only present for locales that were explicitly translated
    #[serde(default)]
    pub translations: BTreeMap<String, PartyTranslation>,
}

impl Party {
    fn base(&self, field: PartyField) -> &str {
        match field {
            PartyField::Name => &self.name,
            PartyField::Leader => &self.leader,
            PartyField::Description => &self.description,
        }
    }

    /// Returns the override for `locale` if one exists and is non-empty, otherwise the base-language value
    pub fn localized(&self, field: PartyField, locale: Locale) -> &str {
        self.translations
            .get(locale.code())
            .and_then(|t| t.get(field))
            .unwrap_or_else(|| self.base(field))
    }
}

/// A party's aggregate vote count as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub party_id: String,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Body of `GET /votes/results`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResultsResponse {
    #[serde(default)]
    pub results: Vec<VoteTally>,
    #[serde(default)]
    pub total_votes: u64,
}

/// Body of `GET /parties`. The backend sends either `{"parties": [...]}` or the bare array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartiesResponse {
    Wrapped { parties: Vec<Party> },
    Bare(Vec<Party>),
}

impl PartiesResponse {
    pub fn into_parties(self) -> Vec<Party> {
        match self {
            PartiesResponse::Wrapped { parties } => parties,
            PartiesResponse::Bare(parties) => parties,
        }
    }
}
