//! Corpus backed by a directory of `*.json` quote files.

use std::path::PathBuf;

use async_trait::async_trait;
use quiz_core::model::CorpusEntry;
use serde::Deserialize;
use serde_json::Value;

use crate::repository::{CorpusSource, Storage, StorageError, string_quotes};

mod name;

pub use name::clean_movie_name;

/// On-disk shape of one movie file: `{ "quotes": ["...", ...] }`.
#[derive(Debug, Deserialize)]
struct QuoteFile {
    quotes: Vec<Value>,
}

/// Reads every `*.json` file in `root`; the movie name comes from the file name.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
}

impl DirectoryCorpus {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn json_file_names(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
                StorageError::malformed(entry.path().display().to_string(), "non UTF-8 file name")
                    .skip();
                continue;
            };
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_entry(&self, file_name: &str) -> Result<CorpusEntry, StorageError> {
        let content = tokio::fs::read_to_string(self.root.join(file_name))
            .await
            .map_err(|e| StorageError::malformed(file_name, e))?;
        let parsed: QuoteFile =
            serde_json::from_str(&content).map_err(|e| StorageError::malformed(file_name, e))?;

        let (quotes, dropped) = string_quotes(parsed.quotes);
        if dropped > 0 {
            tracing::warn!(file = file_name, dropped, "ignoring non-string quotes");
        }
        Ok(CorpusEntry::new(clean_movie_name(file_name), quotes))
    }
}

#[async_trait]
impl CorpusSource for DirectoryCorpus {
    async fn fetch_corpus(&self) -> Result<Vec<CorpusEntry>, StorageError> {
        let names = self.json_file_names().await?;
        if names.is_empty() {
            tracing::warn!(dir = %self.root.display(), "no quote files found");
        }

        let mut entries = Vec::with_capacity(names.len());
        for name in &names {
            match self.read_entry(name).await {
                Ok(entry) => entries.push(entry),
                Err(err) => err.skip(),
            }
        }

        tracing::info!(
            dir = %self.root.display(),
            files = names.len(),
            movies = entries.len(),
            "loaded corpus directory"
        );
        Ok(entries)
    }
}

impl Storage {
    #[must_use]
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self {
            corpus: std::sync::Arc::new(DirectoryCorpus::new(root)),
        }
    }
}
