//! Helpers shared by unit and integration tests: fault injection and recording collaborators
use std::sync::{Arc, Mutex};

use crate::{
    model::{Party, PartyTranslation, VoteTally},
    notify::Notifier,
};

pub mod fault;

/// A [`Notifier`] that keeps every message it was asked to show
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

/// Builds a party with only the fields most tests care about
pub fn party(id: &str, name: &str) -> Party {
    Party {
        id: id.to_string(),
        name: name.to_string(),
        leader: String::new(),
        description: String::new(),
        symbol: None,
        color: None,
        status: Default::default(),
        translations: Default::default(),
    }
}

/// Adds a name override for `locale_code` to `party`
pub fn with_translated_name(mut party: Party, locale_code: &str, name: &str) -> Party {
    party.translations.insert(
        locale_code.to_string(),
        PartyTranslation {
            name: Some(name.to_string()),
            ..Default::default()
        },
    );
    party
}

pub fn tally(party_id: &str, vote_count: u64) -> VoteTally {
    VoteTally {
        party_id: party_id.to_string(),
        vote_count,
        party_name: None,
        symbol: None,
    }
}
