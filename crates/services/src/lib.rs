#![forbid(unsafe_code)]

pub mod error;
pub mod question_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{ErrorResponse, FailureKind, QuizError};
pub use question_service::QuestionService;

pub use sessions::{
    AnswerOutcome, InstallOutcome, LoadTicket, OptionState, OptionView, QuizLoopService,
    QuizPhase, QuizSession, SessionFailure, SessionProgress, SessionView,
};
