mod corpus;
mod ids;
mod question;
mod session;

pub use ids::{ParseIdError, QuestionId};

pub use corpus::{Corpus, CorpusEntry, CorpusError, Movie};
pub use question::{MAX_OPTIONS, Question, QuestionError};
pub use session::{QuizSummary, QuizSummaryError};
