use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds question count ({total})")]
    ScoreOutOfRange { score: u32, total: u32 },
}

/// Final tally of a finished play-through. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    score: u32,
    total: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizSummary {
    /// # Errors
    ///
    /// Returns `QuizSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `QuizSummaryError::ScoreOutOfRange` if `score` exceeds `total`.
    pub fn new(
        score: u32,
        total: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizSummaryError> {
        if completed_at < started_at {
            return Err(QuizSummaryError::InvalidTimeRange);
        }
        if score > total {
            return Err(QuizSummaryError::ScoreOutOfRange { score, total });
        }

        Ok(Self {
            score,
            total,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Wall time from the first question being shown to the game ending.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }

    /// Share of correct answers in `0.0..=1.0`; zero for an empty quiz.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn summary_reports_accuracy() {
        let now = fixed_now();
        let summary = QuizSummary::new(3, 4, now, now + Duration::minutes(2)).unwrap();

        assert_eq!(summary.score(), 3);
        assert_eq!(summary.total(), 4);
        assert!((summary.accuracy() - 0.75).abs() < f64::EPSILON);
        assert_eq!(summary.duration(), Duration::minutes(2));
    }

    #[test]
    fn summary_rejects_inconsistent_values() {
        let now = fixed_now();
        let err = QuizSummary::new(1, 1, now, now - Duration::seconds(1)).unwrap_err();
        assert_eq!(err, QuizSummaryError::InvalidTimeRange);

        let err = QuizSummary::new(2, 1, now, now).unwrap_err();
        assert_eq!(err, QuizSummaryError::ScoreOutOfRange { score: 2, total: 1 });
    }
}
