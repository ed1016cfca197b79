use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::config::DictionaryConfig;

/// First sense of a successful lookup. Only `word` is guaranteed; the
/// upstream schema is sparse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefinitionEntry {
    pub word: String,
    pub phonetic: Option<String>,
    pub origin: Option<String>,
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(DefinitionEntry),
    NotFound,
    ServiceError(String),
}

impl LookupOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupOutcome::Found(_) => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::ServiceError(_) => "service_error",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    word: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMeaning {
    #[serde(default, rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ApiEntry {
    fn into_entry(self, query: &str) -> DefinitionEntry {
        let mut entry = DefinitionEntry {
            word: non_blank(self.word).unwrap_or_else(|| query.to_string()),
            phonetic: self
                .phonetics
                .into_iter()
                .next()
                .and_then(|p| non_blank(p.text)),
            origin: non_blank(self.origin),
            ..Default::default()
        };

        // Part of speech and definition come only from the first meaning,
        // and only when it carries at least one definition.
        if let Some(meaning) = self.meanings.into_iter().next() {
            if let Some(definition) = meaning.definitions.into_iter().next() {
                entry.part_of_speech = non_blank(meaning.part_of_speech);
                entry.definition = non_blank(definition.definition);
                if entry.definition.is_some() {
                    entry.example = non_blank(definition.example);
                }
            }
        }

        entry
    }
}

/// Parse a dictionary response body. Only the first entry is used.
pub fn parse_entries(query: &str, body: &str) -> LookupOutcome {
    let entries: Vec<ApiEntry> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => {
            return LookupOutcome::ServiceError(format!(
                "Failed to parse dictionary response: {}",
                e
            ))
        }
    };

    match entries.into_iter().next() {
        Some(first) => LookupOutcome::Found(first.into_entry(query)),
        None => LookupOutcome::NotFound,
    }
}

pub struct DictionaryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl DictionaryClient {
    pub fn new(config: &DictionaryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid dictionary base_url: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Dictionary base_url cannot take a path: {}", config.base_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Request URL for `word`, percent-encoded as a single path segment.
    pub fn lookup_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(word);
        }
        url
    }

    pub async fn lookup(&self, word: &str) -> LookupOutcome {
        let outcome = match self.fetch(word).await {
            Ok(body) => parse_entries(word, &body),
            Err(e) => LookupOutcome::ServiceError(format!("{:#}", e)),
        };
        debug!("Lookup for {:?}: {}", word, outcome.kind());
        outcome
    }

    async fn fetch(&self, word: &str) -> Result<String> {
        let url = self.lookup_url(word);

        debug!("Sending request to dictionary service: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach the dictionary service")?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!(
                "the dictionary has no entry for \"{}\" ({}). Check the spelling and try again",
                word,
                status
            );
        }
        if !status.is_success() {
            anyhow::bail!("Dictionary service returned {}", status);
        }

        response
            .text()
            .await
            .context("Failed to read dictionary response")
    }
}
