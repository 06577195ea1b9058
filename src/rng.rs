//! Randomness injected into shoes.

use crate::cards::Card;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Permutes a sequence of cards in place.
///
/// Implementations must produce a uniform permutation. Two sources built from
/// the same seed must yield the same sequence of permutations.
pub trait RandomSource {
    fn shuffle(&mut self, cards: &mut [Card]);
}

/// ChaCha8-backed source; seed it for reproducible shoes.
///
/// ```
/// use blackjack_rs::cards::standard_deck;
/// use blackjack_rs::rng::{ChaChaSource, RandomSource};
///
/// let mut a = standard_deck();
/// let mut b = standard_deck();
/// ChaChaSource::seeded(42).shuffle(&mut a);
/// ChaChaSource::seeded(42).shuffle(&mut b);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct ChaChaSource {
    rng: ChaCha8Rng,
}

impl ChaChaSource {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        Self::seeded(seed)
    }
}

impl RandomSource for ChaChaSource {
    fn shuffle(&mut self, cards: &mut [Card]) {
        // SliceRandom::shuffle is an in-place Fisher-Yates pass
        cards.shuffle(&mut self.rng);
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn shuffle(&mut self, cards: &mut [Card]) {
        (**self).shuffle(cards)
    }
}
