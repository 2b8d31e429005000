use rand::Rng;
use thiserror::Error;

use crate::model::{
    Corpus, CorpusEntry, CorpusError, MAX_OPTIONS, Movie, Question, QuestionError, QuestionId,
};
use crate::shuffle::shuffled;

/// Hard cap on questions per batch, bounding session length.
pub const MAX_QUESTIONS: usize = 10;

const MAX_DISTRACTORS: usize = MAX_OPTIONS - 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerateError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Turns a corpus into a batch of "which movie said this?" questions.
///
/// Randomness is injected per call so tests can pass a seeded generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionGenerator;

impl QuestionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Number of questions a batch will hold for `target`:
    /// `min(target, total quotes, MAX_QUESTIONS)`.
    #[must_use]
    pub fn question_count(&self, corpus: &Corpus, target: usize) -> usize {
        target.min(corpus.total_quotes()).min(MAX_QUESTIONS)
    }

    /// Validate raw entries and generate up to `target` questions.
    ///
    /// An empty vector means the corpus is usable but nothing was requested.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::Corpus` if no entry survives validation.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        entries: impl IntoIterator<Item = CorpusEntry>,
        target: usize,
        rng: &mut R,
    ) -> Result<Vec<Question>, GenerateError> {
        let corpus = Corpus::validate(entries)?;
        Ok(self.generate_from(&corpus, target, rng)?)
    }

    /// Generate questions from an already validated corpus.
    ///
    /// Movies are sampled with replacement, so one movie may back several questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if an assembled question breaks the option invariants.
    pub fn generate_from<R: Rng + ?Sized>(
        &self,
        corpus: &Corpus,
        target: usize,
        rng: &mut R,
    ) -> Result<Vec<Question>, QuestionError> {
        let count = self.question_count(corpus, target);
        let names = corpus.distinct_names();
        let mut questions = Vec::with_capacity(count);

        for index in 0..count {
            let movie = &corpus.movies()[rng.random_range(0..corpus.len())];
            let quote = &movie.quotes()[rng.random_range(0..movie.quotes().len())];

            let mut options = pick_distractors(&names, movie.name(), rng);
            options.push(movie.name().to_owned());
            let options = shuffled(&options, rng);

            let id = QuestionId::new(u64::try_from(index + 1).unwrap_or(u64::MAX));
            tracing::debug!(%id, movie = movie.name(), options = options.len(), "assembled question");
            questions.push(build_question(id, movie, quote, options)?);
        }

        tracing::info!(
            requested = target,
            generated = questions.len(),
            movies = corpus.len(),
            "generated question batch"
        );
        Ok(questions)
    }
}

fn build_question(
    id: QuestionId,
    movie: &Movie,
    quote: &str,
    options: Vec<String>,
) -> Result<Question, QuestionError> {
    Question::new(id, quote, options, movie.name(), movie.display_label())
}

/// Up to three names other than `correct`, in random order. Never pads with invented names.
fn pick_distractors<R: Rng + ?Sized>(names: &[&str], correct: &str, rng: &mut R) -> Vec<String> {
    let candidates: Vec<&str> = names.iter().copied().filter(|n| *n != correct).collect();

    let mut chosen: Vec<String> = Vec::with_capacity(MAX_DISTRACTORS);
    for name in shuffled(&candidates, rng) {
        if chosen.len() == MAX_DISTRACTORS {
            break;
        }
        if !chosen.iter().any(|c| c == name) {
            chosen.push(name.to_owned());
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(rows: &[(&str, &[&str])]) -> Vec<CorpusEntry> {
        rows.iter()
            .map(|(name, quotes)| CorpusEntry::new(*name, quotes.iter().copied()))
            .collect()
    }

    fn assert_well_formed(q: &Question) {
        let hits = q.options().iter().filter(|o| *o == q.correct_answer()).count();
        assert_eq!(hits, 1, "{q:?}");
        for (i, o) in q.options().iter().enumerate() {
            assert!(!q.options()[..i].contains(o), "duplicate option in {q:?}");
        }
    }

    #[test]
    fn four_movies_yield_four_options_each() {
        let corpus = entries(&[("A", &["q1"]), ("B", &["q2"]), ("C", &["q3"]), ("D", &["q4"])]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = QuestionGenerator::new()
                .generate(corpus.clone(), 4, &mut rng)
                .unwrap();

            assert_eq!(questions.len(), 4);
            for q in &questions {
                assert_eq!(q.options().len(), 4);
                assert_well_formed(q);
            }
        }
    }

    #[test]
    fn single_movie_single_quote() {
        let mut rng = StdRng::seed_from_u64(3);
        let questions = QuestionGenerator::new()
            .generate(entries(&[("A", &["q1"])]), 10, &mut rng)
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options(), ["A"]);
        assert_eq!(questions[0].quote(), "q1");
        assert_eq!(questions[0].correct_answer(), "A");
    }

    #[test]
    fn two_movies_never_exceed_two_options() {
        let corpus = entries(&[("A", &["a1", "a2", "a3"]), ("B", &["b1", "b2"])]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = QuestionGenerator::new().generate(corpus.clone(), 10, &mut rng).unwrap();

            assert_eq!(questions.len(), 5);
            for q in &questions {
                assert_eq!(q.options().len(), 2);
                assert_well_formed(q);
            }
        }
    }

    #[test]
    fn count_is_capped_by_quotes_and_max() {
        let few = entries(&[("A", &["q1", "q2"]), ("B", &["q3"])]);
        let many_quotes: Vec<String> = (0..30).map(|i| format!("quote {i}")).collect();
        let many = vec![
            CorpusEntry::new("A", many_quotes.clone()),
            CorpusEntry::new("B", many_quotes),
        ];
        let generator = QuestionGenerator::new();
        let mut rng = StdRng::seed_from_u64(11);

        assert_eq!(generator.generate(few, 10, &mut rng).unwrap().len(), 3);
        assert_eq!(
            generator.generate(many.clone(), 50, &mut rng).unwrap().len(),
            MAX_QUESTIONS
        );
        assert_eq!(generator.generate(many, 4, &mut rng).unwrap().len(), 4);
    }

    #[test]
    fn zero_target_is_empty_not_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let questions = QuestionGenerator::new()
            .generate(entries(&[("A", &["q1"])]), 0, &mut rng)
            .unwrap();
        assert!(questions.is_empty());
    }

    #[test]
    fn empty_corpus_is_reported() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = QuestionGenerator::new()
            .generate(entries(&[("  ", &["q"]), ("B", &[" "])]), 10, &mut rng)
            .unwrap_err();
        assert_eq!(err, GenerateError::Corpus(CorpusError::Empty));
    }

    #[test]
    fn duplicate_movie_names_do_not_duplicate_options() {
        let corpus = entries(&[("A", &["a1"]), ("A", &["a2"]), ("B", &["b1"]), ("C", &["c1"])]);
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            for q in QuestionGenerator::new().generate(corpus.clone(), 4, &mut rng).unwrap() {
                assert_eq!(q.options().len(), 3);
                assert_well_formed(&q);
            }
        }
    }

    #[test]
    fn quotes_belong_to_their_answer() {
        let corpus = entries(&[
            ("A", &["a1", "a2"]),
            ("B", &["b1"]),
            ("C", &["c1", "c2"]),
            ("D", &["d1"]),
            ("E", &["e1"]),
        ]);
        let mut rng = StdRng::seed_from_u64(99);
        let questions = QuestionGenerator::new().generate(corpus, 10, &mut rng).unwrap();

        assert_eq!(questions.len(), 7);
        for q in &questions {
            let prefix = q.correct_answer().to_lowercase();
            assert!(q.quote().starts_with(&prefix), "{q:?}");
            assert_eq!(q.options().len(), 4);
        }
    }

    #[test]
    fn ids_are_unique_within_batch() {
        let corpus = entries(&[("A", &["1", "2", "3", "4", "5", "6"])]);
        let mut rng = StdRng::seed_from_u64(5);
        let questions = QuestionGenerator::new().generate(corpus, 6, &mut rng).unwrap();

        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn display_label_travels_with_question() {
        let corpus = vec![CorpusEntry::new("Heat", ["q"]).with_display_label("Heat (1995)")];
        let mut rng = StdRng::seed_from_u64(1);
        let questions = QuestionGenerator::new().generate(corpus, 1, &mut rng).unwrap();

        assert_eq!(questions[0].display_label(), "Heat (1995)");
        assert!(!questions[0].options().contains(&"Heat (1995)".to_string()));
    }

    #[test]
    fn distractor_picks_skip_correct_answer() {
        let mut rng = StdRng::seed_from_u64(8);
        let picks = pick_distractors(&["A", "B", "C", "D", "E"], "C", &mut rng);
        assert_eq!(picks.len(), 3);
        assert!(!picks.contains(&"C".to_string()));

        let picks = pick_distractors(&["A"], "A", &mut rng);
        assert!(picks.is_empty());
    }
}
