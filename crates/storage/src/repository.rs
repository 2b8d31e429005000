use async_trait::async_trait;
use quiz_core::model::CorpusEntry;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by corpus sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A single record could not be read. Sources log and skip these; they never
    /// fail a whole load.
    #[error("malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },
}

impl StorageError {
    pub(crate) fn malformed(record: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            reason: reason.to_string(),
        }
    }

    /// Log a record-level fault and drop it.
    pub(crate) fn skip(self) {
        tracing::warn!(error = %self, "skipping corpus record");
    }
}

/// Capability shared by every corpus backend.
///
/// Implementations return raw entries; validation and filtering happen in the generator.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Load every movie record the backend holds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend-level faults (unreachable store, unreadable
    /// directory). Malformed individual records are skipped, not returned.
    async fn fetch_corpus(&self) -> Result<Vec<CorpusEntry>, StorageError>;
}

/// Keep string quotes from a JSON array, reporting how many items were dropped.
pub(crate) fn string_quotes(values: Vec<Value>) -> (Vec<String>, usize) {
    let total = values.len();
    let quotes: Vec<String> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();
    let dropped = total - quotes.len();
    (quotes, dropped)
}

/// Simple in-memory corpus for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryCorpus {
    entries: Arc<Mutex<Vec<CorpusEntry>>>,
}

impl InMemoryCorpus {
    #[must_use]
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }
}

#[async_trait]
impl CorpusSource for InMemoryCorpus {
    async fn fetch_corpus(&self) -> Result<Vec<CorpusEntry>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Holds the selected corpus backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub corpus: Arc<dyn CorpusSource>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(entries: Vec<CorpusEntry>) -> Self {
        let corpus: Arc<dyn CorpusSource> = Arc::new(InMemoryCorpus::new(entries));
        Self { corpus }
    }
}
