use rand::Rng;
use rand::seq::SliceRandom;

/// Returns `items` in a uniformly random order, leaving the input untouched.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}
