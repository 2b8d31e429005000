use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorpusError {
    #[error("no movies with valid quotes found")]
    Empty,
}

//
// ─── RAW ENTRIES ───────────────────────────────────────────────────────────────
//

/// A movie record as delivered by a corpus source, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub movie_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

impl CorpusEntry {
    #[must_use]
    pub fn new<Q>(movie_name: impl Into<String>, quotes: impl IntoIterator<Item = Q>) -> Self
    where
        Q: Into<String>,
    {
        Self {
            movie_name: movie_name.into(),
            display_label: None,
            quotes: quotes.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a decorated label (e.g. `"Heat (1995)"`) shown after answering.
    #[must_use]
    pub fn with_display_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }
}

//
// ─── VALIDATED CORPUS ──────────────────────────────────────────────────────────
//

/// A movie that survived validation: non-blank name and at least one non-blank quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    name: String,
    display_label: String,
    quotes: Vec<String>,
}

impl Movie {
    fn from_entry(entry: CorpusEntry) -> Option<Self> {
        let name = entry.movie_name.trim();
        if name.is_empty() {
            tracing::warn!(
                quotes = entry.quotes.len(),
                "skipping corpus entry with blank movie name"
            );
            return None;
        }

        let quotes: Vec<String> = entry
            .quotes
            .into_iter()
            .filter(|q| !q.trim().is_empty())
            .collect();
        if quotes.is_empty() {
            tracing::debug!(movie = name, "skipping movie without usable quotes");
            return None;
        }

        let display_label = entry
            .display_label
            .map(|label| label.trim().to_owned())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| name.to_owned());

        Some(Self {
            name: name.to_owned(),
            display_label,
            quotes,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    #[must_use]
    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }
}

/// The usable subset of a raw corpus. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    movies: Vec<Movie>,
}

impl Corpus {
    /// Filter raw entries down to movies that can supply questions.
    ///
    /// Blank movie names and blank quotes are dropped; movies left without quotes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Empty` if nothing survives filtering.
    pub fn validate(entries: impl IntoIterator<Item = CorpusEntry>) -> Result<Self, CorpusError> {
        let movies: Vec<Movie> = entries.into_iter().filter_map(Movie::from_entry).collect();
        if movies.is_empty() {
            return Err(CorpusError::Empty);
        }
        Ok(Self { movies })
    }

    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Number of quotes across every movie.
    #[must_use]
    pub fn total_quotes(&self) -> usize {
        self.movies.iter().map(|m| m.quotes.len()).sum()
    }

    /// Movie names in corpus order, first occurrence wins.
    #[must_use]
    pub fn distinct_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.movies.len());
        for movie in &self.movies {
            if !names.contains(&movie.name()) {
                names.push(movie.name());
            }
        }
        names
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
