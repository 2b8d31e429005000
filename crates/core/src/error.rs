use thiserror::Error;

use crate::generator::GenerateError;
use crate::model::{CorpusError, ParseIdError, QuestionError, QuizSummaryError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Summary(#[from] QuizSummaryError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
