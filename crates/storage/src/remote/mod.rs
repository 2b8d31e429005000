//! Corpus backed by a remote document collection served over HTTP.
//!
//! The collection endpoint returns a JSON array of documents shaped
//! `{ "movie_name": "...", "quotes": ["..."], "year": 1995 }` (`year` optional).

use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::CorpusEntry;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::repository::{CorpusSource, Storage, StorageError, string_quotes};

/// Connection settings for the remote store. Owned by the caller and passed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub collection: String,
    pub api_key: Option<String>,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.collection.trim_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct MovieDocument {
    movie_name: String,
    quotes: Vec<Value>,
    #[serde(default)]
    year: Option<Value>,
}

/// Accepts `1995`, `1995.0` and `"1995"`; anything else is ignored.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn release_year(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|y| u16::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl MovieDocument {
    fn into_entry(self, record: &str) -> CorpusEntry {
        let (quotes, dropped) = string_quotes(self.quotes);
        if dropped > 0 {
            tracing::warn!(record, dropped, "ignoring non-string quotes");
        }
        let entry = CorpusEntry::new(self.movie_name.clone(), quotes);
        let year = match self.year {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let year = release_year(&raw);
                if year.is_none() {
                    tracing::warn!(record, year = %raw, "ignoring unreadable release year");
                }
                year
            }
        };
        match year {
            Some(year) => entry.with_display_label(format!("{} ({year})", self.movie_name.trim())),
            None => entry,
        }
    }
}

/// Turn raw collection documents into corpus entries, skipping malformed ones.
#[must_use]
pub fn decode_documents(documents: Vec<Value>) -> Vec<CorpusEntry> {
    let mut entries = Vec::with_capacity(documents.len());
    for (index, document) in documents.into_iter().enumerate() {
        let record = document
            .get("id")
            .and_then(Value::as_str)
            .map_or_else(|| format!("document #{index}"), ToOwned::to_owned);
        match serde_json::from_value::<MovieDocument>(document) {
            Ok(doc) => entries.push(doc.into_entry(&record)),
            Err(err) => StorageError::malformed(record, err).skip(),
        }
    }
    entries
}

/// Fetches the whole collection with one GET request.
#[derive(Clone)]
pub struct RemoteCorpus {
    client: Client,
    config: RemoteConfig,
}

impl RemoteCorpus {
    #[must_use]
    pub fn new(client: Client, config: RemoteConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CorpusSource for RemoteCorpus {
    async fn fetch_corpus(&self) -> Result<Vec<CorpusEntry>, StorageError> {
        let url = self.config.collection_url();
        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(url));
        }
        if !status.is_success() {
            return Err(StorageError::Connection(format!(
                "remote store returned {status} for {url}"
            )));
        }

        let documents: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let total = documents.len();
        let entries = decode_documents(documents);
        tracing::info!(%url, documents = total, movies = entries.len(), "loaded remote corpus");
        Ok(entries)
    }
}

impl Storage {
    #[must_use]
    pub fn remote(client: Client, config: RemoteConfig) -> Self {
        Self {
            corpus: Arc::new(RemoteCorpus::new(client, config)),
        }
    }
}
