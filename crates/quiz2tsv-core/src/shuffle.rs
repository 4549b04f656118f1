//! Answer order randomization

use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffle answers in place (Fisher-Yates); only the order changes
pub fn shuffle_answers<T, R: Rng + ?Sized>(answers: &mut [T], rng: &mut R) {
    answers.shuffle(rng);
}
