use serde::Serialize;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Upper bound on the option list: the correct answer plus three distractors.
pub const MAX_OPTIONS: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question quote cannot be empty")]
    EmptyQuote,

    #[error("question must have between 1 and {max} options, got {len}")]
    OptionCount { len: usize, max: usize },

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("options do not contain the correct answer {0:?}")]
    MissingAnswer(String),
}

/// A single multiple-choice prompt: which movie is this quote from?
///
/// `display_label` may be a decorated form of `correct_answer` and is meant for feedback only;
/// it never appears among `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    quote: String,
    options: Vec<String>,
    correct_answer: String,
    display_label: String,
}

impl Question {
    /// Build a question, checking the option list.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the quote is blank, the option count is outside `1..=4`,
    /// an option repeats, or the correct answer is missing from the options.
    pub fn new(
        id: QuestionId,
        quote: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        display_label: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let quote = quote.into();
        let correct_answer = correct_answer.into();

        if quote.trim().is_empty() {
            return Err(QuestionError::EmptyQuote);
        }
        if options.is_empty() || options.len() > MAX_OPTIONS {
            return Err(QuestionError::OptionCount {
                len: options.len(),
                max: MAX_OPTIONS,
            });
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::MissingAnswer(correct_answer));
        }

        Ok(Self {
            id,
            quote,
            options,
            correct_answer,
            display_label: display_label.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}
