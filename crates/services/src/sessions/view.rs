use super::service::{QuizPhase, QuizSession};

/// How a single option button should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    /// Selectable; no answer given yet.
    Open,
    /// The correct answer, revealed after answering.
    Correct,
    /// The player's wrong pick.
    WrongPick,
    /// Neither correct nor picked; inert after answering.
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: String,
    pub state: OptionState,
}

/// Presentation-agnostic snapshot of a quiz session.
///
/// Holds just enough for a front end to draw one frame: the quote, the option buttons, the
/// feedback line, and the score banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: QuizPhase,
    pub question_number: usize,
    pub total: usize,
    pub quote: Option<String>,
    pub options: Vec<OptionView>,
    pub feedback: Option<String>,
    pub score_line: String,
    pub error: Option<String>,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let total = session.questions().len();
        let phase = session.phase();
        let question = session.current_question();

        let options = question
            .map(|q| {
                q.options()
                    .iter()
                    .map(|label| OptionView {
                        label: label.clone(),
                        state: option_state(phase, label, q.correct_answer(), session.selected_answer()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let feedback = match (phase, question) {
            (QuizPhase::AnsweredCorrect, Some(_)) => Some("Correct!".to_owned()),
            (QuizPhase::AnsweredIncorrect, Some(q)) => {
                Some(format!("Incorrect! The movie was {}.", q.display_label()))
            }
            _ => None,
        };

        Self {
            phase,
            question_number: if question.is_some() { session.current_index() + 1 } else { 0 },
            total,
            quote: question.map(|q| q.quote().to_owned()),
            options,
            feedback,
            score_line: format!("Score: {} / {}", session.score(), total),
            error: session.last_error().map(|failure| failure.message.clone()),
        }
    }

    /// Whether option buttons accept input.
    #[must_use]
    pub fn accepts_answers(&self) -> bool {
        self.phase == QuizPhase::Ready
    }
}

fn option_state(phase: QuizPhase, label: &str, correct: &str, selected: Option<&str>) -> OptionState {
    if !phase.is_answered() {
        return OptionState::Open;
    }
    if label == correct {
        OptionState::Correct
    } else if selected == Some(label) {
        OptionState::WrongPick
    } else {
        OptionState::Inactive
    }
}
