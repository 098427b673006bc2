//! Machine translation of party texts into the supported UI languages.
//!
//! The provider sits behind the narrow [`Translator`] trait. Callers go through [`translate_or_original`],
//! whose contract is that a failed translation yields the source text, never an error.
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{event, instrument, Level};

use crate::{
    client::error::{Error, Result},
    model::{Locale, Party, PartyTranslation},
};

/// Source language of every party text
pub const SOURCE_LOCALE: Locale = Locale::En;

pub const MYMEMORY_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Trait that defines a text translation provider
#[async_trait]
pub trait Translator {
    /// Translates `text` from [`SOURCE_LOCALE`] into `target`
    async fn translate(&self, text: &str, target: Locale) -> Result<String>;
}

/// Translates `text`, falling back to `text` itself if the provider fails or returns nothing.
/// Blank texts and the source language are returned untouched without calling the provider.
pub async fn translate_or_original(
    translator: &(dyn Translator + Send + Sync),
    text: &str,
    target: Locale,
) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || target == SOURCE_LOCALE {
        return text.to_string();
    }

    match translator.translate(trimmed, target).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => text.to_string(),
        Err(err) => {
            event!(
                Level::WARN,
                "translation to {} failed, keeping original text: {}",
                target,
                err
            );
            text.to_string()
        }
    }
}

async fn translate_field(
    translator: &(dyn Translator + Send + Sync),
    text: &str,
    target: Locale,
) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    Some(translate_or_original(translator, text, target).await)
}

/// Builds the `translations` map for `party`. The source-language entry mirrors the base fields; every other
/// locale in `targets` gets machine-translated name, leader and description. Empty fields are skipped.
#[instrument(level = "debug", skip(translator, party), fields(party = %party.id))]
pub async fn translate_party(
    translator: &(dyn Translator + Send + Sync),
    party: &Party,
    targets: &[Locale],
) -> BTreeMap<String, PartyTranslation> {
    let mut translations = BTreeMap::new();
    translations.insert(
        SOURCE_LOCALE.code().to_string(),
        PartyTranslation {
            name: Some(party.name.clone()),
            leader: Some(party.leader.clone()),
            description: Some(party.description.clone()),
        },
    );

    for target in targets.iter().filter(|t| **t != SOURCE_LOCALE) {
        let (name, leader, description) = futures::join!(
            translate_field(translator, &party.name, *target),
            translate_field(translator, &party.leader, *target),
            translate_field(translator, &party.description, *target),
        );

        translations.insert(
            target.code().to_string(),
            PartyTranslation {
                name,
                leader,
                description,
            },
        );
    }

    translations
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryResponseData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponseData {
    translated_text: Option<String>,
}

/// [`Translator`] backed by the free MyMemory API
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    endpoint: String,
    http: reqwest::Client,
}

impl MyMemoryTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

impl Default for MyMemoryTranslator {
    fn default() -> Self {
        Self::new(MYMEMORY_ENDPOINT)
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, text: &str, target: Locale) -> Result<String> {
        let langpair = format!("{}|{}", SOURCE_LOCALE.code(), target.code());
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: MyMemoryResponse = response.json().await?;
        body.response_data
            .and_then(|data| data.translated_text)
            .ok_or(Error::InvalidServerResponse {
                reason: "translation response without responseData.translatedText".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::{
        client::error::{Error, Result},
        model::Locale,
        test_utils::party,
    };

    use super::{translate_or_original, translate_party, Translator};

    /// Tags the text with the target locale and counts calls
    #[derive(Default)]
    struct TaggingTranslator {
        n_calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(&self, text: &str, target: Locale) -> Result<String> {
            self.n_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", target, text))
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _target: Locale) -> Result<String> {
            Err(Error::UnableToConnect {
                reason: "Mocked translation failure".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn translates_to_target() {
        let translator = TaggingTranslator::default();
        assert_eq!(
            translate_or_original(&translator, "Alpha", Locale::Hi).await,
            "[hi] Alpha"
        );
    }

    #[tokio::test]
    async fn falls_back_to_original_on_failure() {
        assert_eq!(
            translate_or_original(&FailingTranslator, "Alpha", Locale::Mr).await,
            "Alpha"
        );
    }

    #[tokio::test]
    async fn source_locale_and_blank_text_skip_the_provider() {
        let translator = TaggingTranslator::default();
        assert_eq!(translate_or_original(&translator, "Alpha", Locale::En).await, "Alpha");
        assert_eq!(translate_or_original(&translator, "  ", Locale::Hi).await, "  ");
        assert_eq!(translator.n_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn party_translations_for_all_locales() {
        let translator = TaggingTranslator::default();
        let mut alpha = party("A", "Alpha");
        alpha.leader = "Leader".to_string();

        let translations =
            translate_party(&translator, &alpha, &[Locale::En, Locale::Hi, Locale::Mr]).await;

        assert_eq!(translations.len(), 3);
        assert_eq!(translations["en"].name.as_deref(), Some("Alpha"));
        assert_eq!(translations["hi"].name.as_deref(), Some("[hi] Alpha"));
        assert_eq!(translations["mr"].leader.as_deref(), Some("[mr] Leader"));
        // empty description is never sent
        assert_eq!(translations["hi"].description, None);
        assert_eq!(translator.n_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn party_translation_survives_provider_failure() {
        let alpha = party("A", "Alpha");
        let translations = translate_party(&FailingTranslator, &alpha, &[Locale::Hi]).await;
        assert_eq!(translations["hi"].name.as_deref(), Some("Alpha"));
    }
}
