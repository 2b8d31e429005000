mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use progress::SessionProgress;
pub use service::{
    AnswerOutcome, InstallOutcome, LoadTicket, QuizPhase, QuizSession, SessionFailure,
};
pub use view::{OptionState, OptionView, SessionView};
pub use workflow::QuizLoopService;
