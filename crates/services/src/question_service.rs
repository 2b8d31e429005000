use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::model::Question;
use quiz_core::{MAX_QUESTIONS, QuestionGenerator};
use storage::repository::CorpusSource;

use crate::error::{ErrorResponse, QuizError};

/// Generation endpoint: fetches the corpus and turns it into a question batch.
pub struct QuestionService {
    source: Arc<dyn CorpusSource>,
    generator: QuestionGenerator,
    target: usize,
    rng: Mutex<StdRng>,
}

impl QuestionService {
    #[must_use]
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            generator: QuestionGenerator::new(),
            target: MAX_QUESTIONS,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Requested batch size; the generator still caps it.
    #[must_use]
    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    /// Use a seeded generator for reproducible batches.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Fetch and generate. An empty vector means the corpus was usable but yielded nothing.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Acquisition` if the source fails and `QuizError::EmptyCorpus` if no
    /// movie survives validation.
    pub async fn questions(&self) -> Result<Vec<Question>, QuizError> {
        let entries = self.source.fetch_corpus().await?;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.generator.generate(entries, self.target, &mut *rng)?)
    }

    /// Like [`Self::questions`] but treats an empty batch as a failure, for callers that need
    /// something to play.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestionsProducible` for an empty batch, plus every error of
    /// [`Self::questions`].
    pub async fn playable_questions(&self) -> Result<Vec<Question>, QuizError> {
        let questions = self.questions().await?;
        if questions.is_empty() {
            return Err(QuizError::NoQuestionsProducible);
        }
        Ok(questions)
    }

    /// Endpoint-shaped result: the batch, or a structured error body with a status.
    ///
    /// # Errors
    ///
    /// Returns `ErrorResponse` describing the failure.
    pub async fn respond(&self) -> Result<Vec<Question>, ErrorResponse> {
        self.questions().await.map_err(|err| {
            tracing::error!(error = %err, "question generation failed");
            err.to_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::CorpusEntry;
    use storage::repository::InMemoryCorpus;

    fn service(entries: Vec<CorpusEntry>) -> QuestionService {
        QuestionService::new(Arc::new(InMemoryCorpus::new(entries))).with_seed(17)
    }

    #[tokio::test]
    async fn scenario_four_movies() {
        let svc = service(vec![
            CorpusEntry::new("A", ["q1"]),
            CorpusEntry::new("B", ["q2"]),
            CorpusEntry::new("C", ["q3"]),
            CorpusEntry::new("D", ["q4"]),
        ])
        .with_target(4);

        let questions = svc.questions().await.unwrap();
        assert_eq!(questions.len(), 4);
        for q in &questions {
            assert_eq!(q.options().len(), 4);
            assert!(q.options().iter().any(|o| o == q.correct_answer()));
        }
    }

    #[tokio::test]
    async fn empty_corpus_is_an_error_response() {
        let svc = service(vec![CorpusEntry::new(" ", ["q"])]);

        assert!(matches!(svc.questions().await, Err(QuizError::EmptyCorpus)));
        let body = svc.respond().await.unwrap_err();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "No movies with valid quotes found");
    }

    #[tokio::test]
    async fn zero_target_is_empty_then_unplayable() {
        let svc = service(vec![CorpusEntry::new("A", ["q1"])]).with_target(0);

        assert!(svc.respond().await.unwrap().is_empty());
        assert!(matches!(
            svc.playable_questions().await,
            Err(QuizError::NoQuestionsProducible)
        ));
    }

    #[tokio::test]
    async fn same_seed_same_batch() {
        let entries = vec![
            CorpusEntry::new("A", ["a1", "a2"]),
            CorpusEntry::new("B", ["b1", "b2"]),
            CorpusEntry::new("C", ["c1"]),
        ];
        let a = service(entries.clone()).questions().await.unwrap();
        let b = service(entries).questions().await.unwrap();
        assert_eq!(a, b);
    }
}
