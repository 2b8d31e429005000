use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{Question, QuestionId, QuizSummary};

use super::progress::SessionProgress;
use crate::error::{FailureKind, QuizError};

//
// ─── PHASES & TICKETS ──────────────────────────────────────────────────────────
//

/// Discrete state of a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    Ready,
    AnsweredCorrect,
    AnsweredIncorrect,
    GameOver,
    Error,
}

impl QuizPhase {
    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, Self::AnsweredCorrect | Self::AnsweredIncorrect)
    }
}

/// Identifies one corpus acquisition. Only the most recently issued ticket may install results.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl fmt::Debug for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadTicket({})", self.0)
    }
}

/// Why the session sits in `QuizPhase::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// What `install` did with an acquisition outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Ready,
    Failed,
    /// The ticket was superseded; the outcome was dropped.
    Stale,
}

/// Captures the outcome of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub choice: String,
    pub is_correct: bool,
    pub score: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory, single-player quiz state machine.
///
/// Every operation is synchronous and total: calling one in a phase that does not allow it
/// leaves the session untouched.
pub struct QuizSession {
    clock: Clock,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    phase: QuizPhase,
    selected: Option<String>,
    failure: Option<SessionFailure>,
    ticket: LoadTicket,
    started_at: Option<DateTime<Utc>>,
    summary: Option<QuizSummary>,
}

impl QuizSession {
    /// A fresh session in `Loading`, waiting on the ticket returned by [`Self::ticket`].
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            questions: Vec::new(),
            current: 0,
            score: 0,
            phase: QuizPhase::Loading,
            selected: None,
            failure: None,
            ticket: LoadTicket(1),
            started_at: None,
            summary: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&SessionFailure> {
        self.failure.as_ref()
    }

    /// The ticket an in-flight acquisition must present to `install`.
    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Final tally, available once the session reaches `GameOver`.
    #[must_use]
    pub fn summary(&self) -> Option<&QuizSummary> {
        self.summary.as_ref()
    }

    /// The question on screen; `None` outside `Ready` and the answered phases.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Ready | QuizPhase::AnsweredCorrect | QuizPhase::AnsweredIncorrect => {
                self.questions.get(self.current)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == QuizPhase::GameOver
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = match self.phase {
            QuizPhase::AnsweredCorrect | QuizPhase::AnsweredIncorrect | QuizPhase::GameOver => {
                (self.current + 1).min(total)
            }
            _ => self.current.min(total),
        };
        SessionProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: self.is_game_over(),
        }
    }

    /// Apply an acquisition result fetched under `ticket`.
    ///
    /// Results for superseded tickets, or arriving when the session is not loading, are
    /// discarded. An empty batch is reported as `NoQuestionsProducible`.
    pub fn install(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Vec<Question>, QuizError>,
    ) -> InstallOutcome {
        if self.phase != QuizPhase::Loading || ticket != self.ticket {
            tracing::debug!(?ticket, latest = ?self.ticket, phase = ?self.phase, "discarding stale load");
            return InstallOutcome::Stale;
        }

        match outcome {
            Ok(questions) if !questions.is_empty() => {
                tracing::info!(questions = questions.len(), "quiz ready");
                self.questions = questions;
                self.started_at = Some(self.clock.now());
                self.phase = QuizPhase::Ready;
                InstallOutcome::Ready
            }
            Ok(_) => {
                self.fail(&QuizError::NoQuestionsProducible);
                InstallOutcome::Failed
            }
            Err(err) => {
                self.fail(&err);
                InstallOutcome::Failed
            }
        }
    }

    /// Answer the current question. The first answer is binding; later calls are ignored.
    pub fn submit_answer(&mut self, choice: &str) -> Option<AnswerOutcome> {
        if self.phase != QuizPhase::Ready {
            return None;
        }
        let question = self.questions.get(self.current)?;

        let is_correct = question.is_correct(choice);
        let question_id = question.id();
        if is_correct {
            self.score = self.score.saturating_add(1);
            self.phase = QuizPhase::AnsweredCorrect;
        } else {
            self.phase = QuizPhase::AnsweredIncorrect;
        }
        self.selected = Some(choice.to_owned());

        Some(AnswerOutcome {
            question_id,
            choice: choice.to_owned(),
            is_correct,
            score: self.score,
        })
    }

    /// Move past an answered question. Returns `false` when the call was ignored.
    pub fn advance(&mut self) -> bool {
        if !self.phase.is_answered() {
            return false;
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.phase = QuizPhase::Ready;
        } else {
            self.phase = QuizPhase::GameOver;
            self.summary = self.build_summary();
            tracing::info!(score = self.score, total = self.questions.len(), "quiz finished");
        }
        true
    }

    /// Throw away the current run and start loading a new one.
    ///
    /// Accepted in `GameOver`, `Error`, and `Loading` (superseding the in-flight load).
    pub fn restart(&mut self) -> Option<LoadTicket> {
        match self.phase {
            QuizPhase::GameOver | QuizPhase::Error | QuizPhase::Loading => Some(self.begin_loading()),
            _ => None,
        }
    }

    /// Re-attempt acquisition after a failure. Accepted in `Error` and `Loading`.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        match self.phase {
            QuizPhase::Error | QuizPhase::Loading => Some(self.begin_loading()),
            _ => None,
        }
    }

    fn begin_loading(&mut self) -> LoadTicket {
        self.ticket = LoadTicket(self.ticket.0 + 1);
        self.questions.clear();
        self.current = 0;
        self.score = 0;
        self.selected = None;
        self.failure = None;
        self.started_at = None;
        self.summary = None;
        self.phase = QuizPhase::Loading;
        self.ticket
    }

    fn fail(&mut self, err: &QuizError) {
        tracing::warn!(error = %err, "quiz could not start");
        self.failure = Some(SessionFailure {
            kind: err.kind(),
            message: err.user_message(),
        });
        self.phase = QuizPhase::Error;
    }

    fn build_summary(&self) -> Option<QuizSummary> {
        let started_at = self.started_at?;
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        QuizSummary::new(self.score, total, started_at, self.clock.now())
            .inspect_err(|err| tracing::warn!(error = %err, "could not build quiz summary"))
            .ok()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use storage::repository::StorageError;

    fn question(id: u64, answer: &str, options: &[&str]) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("quote {id}"),
            options.iter().map(|s| (*s).to_string()).collect(),
            answer,
            format!("{answer} (1999)"),
        )
        .unwrap()
    }

    fn ready_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new(fixed_clock());
        let ticket = session.ticket();
        assert_eq!(session.install(ticket, Ok(questions)), InstallOutcome::Ready);
        session
    }

    #[test]
    fn single_question_scenario() {
        let mut session = ready_session(vec![question(1, "A", &["A"])]);
        assert_eq!(session.phase(), QuizPhase::Ready);

        let outcome = session.submit_answer("A").unwrap();
        assert!(outcome.is_correct);
        assert_eq!(session.phase(), QuizPhase::AnsweredCorrect);
        assert_eq!(session.score(), 1);

        assert!(session.advance());
        assert_eq!(session.phase(), QuizPhase::GameOver);
        assert_eq!(session.summary().unwrap().score(), 1);
        assert_eq!(session.summary().unwrap().total(), 1);
    }

    #[test]
    fn first_answer_is_binding() {
        let mut session = ready_session(vec![question(1, "A", &["A", "B"])]);

        assert!(session.submit_answer("B").is_some());
        assert!(session.submit_answer("A").is_none());

        assert_eq!(session.score(), 0);
        assert_eq!(session.selected_answer(), Some("B"));
        assert_eq!(session.phase(), QuizPhase::AnsweredIncorrect);
    }

    #[test]
    fn advance_steps_through_questions() {
        let mut session = ready_session(vec![
            question(1, "A", &["A", "B"]),
            question(2, "B", &["A", "B"]),
        ]);

        assert!(!session.advance(), "advance before answering is ignored");
        session.submit_answer("A");
        assert!(session.advance());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.selected_answer(), None);
        assert_eq!(session.phase(), QuizPhase::Ready);
        assert_eq!(session.current_question().unwrap().id(), QuestionId::new(2));

        session.submit_answer("A");
        assert!(session.advance());
        assert!(session.is_game_over());
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn score_is_frozen_after_game_over() {
        let mut session = ready_session(vec![question(1, "A", &["A", "B"])]);
        session.submit_answer("A");
        session.advance();

        assert!(session.submit_answer("A").is_none());
        assert!(!session.advance());
        assert_eq!(session.score(), 1);
        assert_eq!(session.phase(), QuizPhase::GameOver);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn loading_ignores_answers() {
        let mut session = QuizSession::new(fixed_clock());
        assert!(session.submit_answer("A").is_none());
        assert!(!session.advance());
        assert_eq!(session.phase(), QuizPhase::Loading);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn empty_batch_moves_to_error() {
        let mut session = QuizSession::new(fixed_clock());
        let ticket = session.ticket();

        assert_eq!(session.install(ticket, Ok(Vec::new())), InstallOutcome::Failed);
        assert_eq!(session.phase(), QuizPhase::Error);
        assert_eq!(session.last_error().unwrap().kind, FailureKind::NoQuestions);
    }

    #[test]
    fn acquisition_failure_then_retry() {
        let mut session = QuizSession::new(fixed_clock());
        let ticket = session.ticket();
        let err = QuizError::Acquisition(StorageError::Connection("offline".into()));

        session.install(ticket, Err(err));
        assert_eq!(session.phase(), QuizPhase::Error);
        assert_eq!(session.last_error().unwrap().kind, FailureKind::Acquisition);

        let retry = session.retry().unwrap();
        assert_eq!(session.phase(), QuizPhase::Loading);
        assert!(session.last_error().is_none());
        assert_eq!(
            session.install(retry, Ok(vec![question(1, "A", &["A"])])),
            InstallOutcome::Ready
        );
    }

    #[test]
    fn stale_install_is_discarded() {
        let mut session = QuizSession::new(fixed_clock());
        let first = session.ticket();
        let second = session.restart().unwrap();
        assert_ne!(first, second);

        assert_eq!(
            session.install(first, Ok(vec![question(1, "A", &["A"])])),
            InstallOutcome::Stale
        );
        assert_eq!(session.phase(), QuizPhase::Loading);

        assert_eq!(
            session.install(second, Ok(vec![question(2, "B", &["B"])])),
            InstallOutcome::Ready
        );
        assert_eq!(session.current_question().unwrap().correct_answer(), "B");

        // A late duplicate for the same ticket is also ignored once ready.
        assert_eq!(session.install(second, Ok(Vec::new())), InstallOutcome::Stale);
        assert_eq!(session.phase(), QuizPhase::Ready);
    }

    #[test]
    fn restart_resets_score_and_index() {
        let mut session = ready_session(vec![question(1, "A", &["A"])]);
        session.submit_answer("A");
        session.advance();

        let ticket = session.restart().unwrap();
        assert_eq!(session.phase(), QuizPhase::Loading);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert!(session.questions().is_empty());
        assert!(session.summary().is_none());

        session.install(ticket, Ok(vec![question(1, "A", &["A"])]));
        assert_eq!(session.phase(), QuizPhase::Ready);
    }

    #[test]
    fn restart_and_retry_are_ignored_mid_game() {
        let mut session = ready_session(vec![question(1, "A", &["A"])]);
        assert!(session.restart().is_none());
        assert!(session.retry().is_none());

        session.submit_answer("A");
        assert!(session.restart().is_none());
        assert_eq!(session.phase(), QuizPhase::AnsweredCorrect);
    }

    #[test]
    fn progress_counts_answered_questions() {
        let mut session = ready_session(vec![
            question(1, "A", &["A"]),
            question(2, "A", &["A"]),
            question(3, "A", &["A"]),
        ]);
        assert_eq!(session.progress().answered, 0);

        session.submit_answer("A");
        let progress = session.progress();
        assert_eq!((progress.answered, progress.remaining), (1, 2));

        session.advance();
        session.submit_answer("nope");
        session.advance();
        session.submit_answer("A");
        session.advance();
        let progress = session.progress();
        assert_eq!((progress.answered, progress.remaining), (3, 0));
        assert!(progress.is_complete);
        assert_eq!(session.score(), 2);
    }
}
