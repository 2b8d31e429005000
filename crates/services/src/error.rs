//! Shared error types for the services crate.

use serde::Serialize;
use thiserror::Error;

use quiz_core::GenerateError;
use quiz_core::model::CorpusError;
use storage::repository::StorageError;

/// Corpus-level failures of a question request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no movies with valid quotes found")]
    EmptyCorpus,
    #[error("the corpus produced no questions")]
    NoQuestionsProducible,
    #[error("failed to load corpus: {0}")]
    Acquisition(#[from] StorageError),
    #[error(transparent)]
    Generation(GenerateError),
}

impl From<GenerateError> for QuizError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Corpus(CorpusError::Empty) => Self::EmptyCorpus,
            other => Self::Generation(other),
        }
    }
}

/// Coarse classification the presentation layer can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyCorpus,
    NoQuestions,
    Acquisition,
    Internal,
}

/// Structured error body returned by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl QuizError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyCorpus => FailureKind::EmptyCorpus,
            Self::NoQuestionsProducible => FailureKind::NoQuestions,
            Self::Acquisition(_) => FailureKind::Acquisition,
            Self::Generation(_) => FailureKind::Internal,
        }
    }

    /// Message suitable for showing to the player.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCorpus => "No questions available. Try again later.".into(),
            Self::NoQuestionsProducible => {
                "Quotes were found, but no questions could be made from them.".into()
            }
            Self::Acquisition(_) | Self::Generation(_) => {
                "Could not load questions. Please try again later.".into()
            }
        }
    }

    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::EmptyCorpus => ErrorResponse {
                status: 500,
                error: "No movies with valid quotes found".into(),
                details: None,
            },
            Self::NoQuestionsProducible => ErrorResponse {
                status: 422,
                error: "No questions could be generated".into(),
                details: None,
            },
            Self::Acquisition(err) => ErrorResponse {
                status: 500,
                error: "Failed to generate questions".into(),
                details: Some(err.to_string()),
            },
            Self::Generation(err) => ErrorResponse {
                status: 500,
                error: "Failed to generate questions".into(),
                details: Some(err.to_string()),
            },
        }
    }
}
