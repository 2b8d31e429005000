//! Line-oriented terminal front end for a quiz session.

use std::io::{self, Write};

use quiz_core::model::QuizSummary;
use services::{OptionState, QuizLoopService, QuizPhase, SessionView};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Drive one player through as many games as they want.
///
/// Reads commands from `input` one line at a time and ends on `q` or end of input.
///
/// # Errors
///
/// Returns `io::Error` if reading input or writing output fails.
pub async fn run<R, W>(svc: &QuizLoopService, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(out, "Loading questions...")?;
    let mut session = svc.start().await;

    loop {
        let view = SessionView::from_session(&session);
        match view.phase {
            QuizPhase::Loading => {
                let ticket = session.ticket();
                svc.load(&mut session, ticket).await;
            }
            QuizPhase::Ready => {
                render_question(out, &view)?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                let line = line.trim();
                if line.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                match pick(&view, line) {
                    Some(choice) => {
                        session.submit_answer(choice);
                    }
                    None => writeln!(out, "Pick a number between 1 and {}.", view.options.len())?,
                }
            }
            QuizPhase::AnsweredCorrect | QuizPhase::AnsweredIncorrect => {
                render_feedback(out, &view)?;
                writeln!(out, "Press Enter to continue.")?;
                if lines.next_line().await?.is_none() {
                    return Ok(());
                }
                session.advance();
            }
            QuizPhase::GameOver => {
                writeln!(out, "Game over! {}", view.score_line)?;
                if let Some(summary) = session.summary() {
                    writeln!(out, "{}", summary_line(summary))?;
                }
                writeln!(out, "Play again? [y/N]")?;
                if !confirmed(lines.next_line().await?) {
                    return Ok(());
                }
                writeln!(out, "Loading questions...")?;
                svc.restart(&mut session).await;
            }
            QuizPhase::Error => {
                writeln!(out, "{}", view.error.as_deref().unwrap_or("Something went wrong."))?;
                writeln!(out, "Try again? [y/N]")?;
                if !confirmed(lines.next_line().await?) {
                    return Ok(());
                }
                writeln!(out, "Loading questions...")?;
                svc.restart(&mut session).await;
            }
        }
    }
}

fn summary_line(summary: &QuizSummary) -> String {
    let seconds = summary.duration().num_seconds().max(0);
    format!(
        "Accuracy: {:.0}% in {}m {:02}s",
        summary.accuracy() * 100.0,
        seconds / 60,
        seconds % 60
    )
}

fn pick<'a>(view: &'a SessionView, line: &str) -> Option<&'a str> {
    let index = line.parse::<usize>().ok()?.checked_sub(1)?;
    view.options.get(index).map(|option| option.label.as_str())
}

fn confirmed(line: Option<String>) -> bool {
    line.is_some_and(|line| matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn render_question<W: Write>(out: &mut W, view: &SessionView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Question {} of {}    {}",
        view.question_number, view.total, view.score_line
    )?;
    writeln!(out, "\"{}\"", view.quote.as_deref().unwrap_or_default())?;
    for (i, option) in view.options.iter().enumerate() {
        writeln!(out, "  {}) {}", i + 1, option.label)?;
    }
    write!(out, "> ")?;
    out.flush()
}

fn render_feedback<W: Write>(out: &mut W, view: &SessionView) -> io::Result<()> {
    for (i, option) in view.options.iter().enumerate() {
        let mark = match option.state {
            OptionState::Correct => " <- correct",
            OptionState::WrongPick => " <- your pick",
            OptionState::Open | OptionState::Inactive => "",
        };
        writeln!(out, "  {}) {}{mark}", i + 1, option.label)?;
    }
    if let Some(feedback) = &view.feedback {
        writeln!(out, "{feedback}")?;
    }
    writeln!(out, "{}", view.score_line)
}
