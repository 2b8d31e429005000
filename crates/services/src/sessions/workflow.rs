use std::sync::Arc;

use quiz_core::model::Question;

use crate::Clock;
use crate::error::QuizError;
use crate::question_service::QuestionService;
use super::service::{InstallOutcome, LoadTicket, QuizSession};

/// Orchestrates acquisition for a quiz session: fetch under a ticket, then install.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<QuestionService>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<QuestionService>) -> Self {
        Self { clock, questions }
    }

    /// Create a session and run its first load.
    pub async fn start(&self) -> QuizSession {
        let mut session = QuizSession::new(self.clock);
        let ticket = session.ticket();
        self.load(&mut session, ticket).await;
        session
    }

    /// Restart a finished or failed session. Returns `None` if the session refused.
    pub async fn restart(&self, session: &mut QuizSession) -> Option<InstallOutcome> {
        let ticket = session.restart()?;
        Some(self.load(session, ticket).await)
    }

    /// Retry acquisition after a failure. Returns `None` if the session refused.
    pub async fn retry(&self, session: &mut QuizSession) -> Option<InstallOutcome> {
        let ticket = session.retry()?;
        Some(self.load(session, ticket).await)
    }

    /// Fetch a batch for `ticket` and hand it to the session.
    pub async fn load(&self, session: &mut QuizSession, ticket: LoadTicket) -> InstallOutcome {
        let outcome = self.questions.playable_questions().await;
        session.install(ticket, outcome)
    }

    /// Fetch a batch without touching a session, for callers that install later.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if acquisition fails or the batch is empty.
    pub async fn fetch(&self) -> Result<Vec<Question>, QuizError> {
        self.questions.playable_questions().await
    }
}
