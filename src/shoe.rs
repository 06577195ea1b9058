//! Multi-deck shoe with penetration tracking.
//!
//! The shoe never reshuffles on its own while cards are being dealt. Once a
//! draw leaves the remaining fraction below the configured threshold it queues
//! a [`ShoeEvent::ReshuffleNeeded`] notice; the caller decides when to act on
//! it (normally between rounds) via [`Shoe::trigger_reshuffle`].

use crate::cards::{standard_deck, Card};
use crate::config::GameConfig;
use crate::error::ErrorKind;
use crate::rng::RandomSource;
use std::collections::VecDeque;
use std::fmt;
use std::time::SystemTime;

pub const CARDS_PER_DECK: usize = 52;

/// Threshold used by [`Shoe::needs_reshuffle`] and by newly built shoes.
pub const DEFAULT_RESHUFFLE_THRESHOLD: f64 = 0.25;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ShoeError {
    #[error("cannot draw from an empty shoe")]
    Empty,
    #[error("deck count must be at least 1, got {0}")]
    InvalidDeckCount(usize),
    #[error("penetration threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

impl ShoeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShoeError::Empty => ErrorKind::EmptySource,
            ShoeError::InvalidDeckCount(_) | ShoeError::InvalidThreshold(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

/// Details attached to every shoe notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ReshuffleNotice {
    pub reason: String,
    /// Remaining fraction of the shoe, in `[0, 1]`, when the notice was raised.
    pub remaining_percentage: f64,
    pub threshold: f64,
    pub at: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ShoeEvent {
    /// Remaining cards dropped below the threshold after a draw.
    ReshuffleNeeded(ReshuffleNotice),
    /// The shoe was refilled and shuffled through [`Shoe::trigger_reshuffle`].
    Reshuffled(ReshuffleNotice),
}

impl ShoeEvent {
    pub fn notice(&self) -> &ReshuffleNotice {
        match self {
            ShoeEvent::ReshuffleNeeded(n) | ShoeEvent::Reshuffled(n) => n,
        }
    }
}

/// A FIFO of `deck_count` standard decks.
///
/// ```
/// use blackjack_rs::rng::ChaChaSource;
/// use blackjack_rs::shoe::Shoe;
///
/// let mut shoe = Shoe::new(6, ChaChaSource::seeded(1)).unwrap();
/// assert_eq!(shoe.remaining_cards(), 312);
/// shoe.draw().unwrap();
/// assert_eq!(shoe.remaining_cards(), 311);
/// ```
pub struct Shoe {
    cards: VecDeque<Card>,
    deck_count: usize,
    penetration_threshold: f64,
    auto_reshuffle: bool,
    rng: Box<dyn RandomSource + Send>,
    events: Vec<ShoeEvent>,
}

impl fmt::Debug for Shoe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shoe")
            .field("remaining", &self.cards.len())
            .field("deck_count", &self.deck_count)
            .field("penetration_threshold", &self.penetration_threshold)
            .field("auto_reshuffle", &self.auto_reshuffle)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Shoe {
    /// Build a full, shuffled shoe with the default threshold.
    pub fn new<R>(deck_count: usize, rng: R) -> Result<Self, ShoeError>
    where
        R: RandomSource + Send + 'static,
    {
        Self::try_new(deck_count, DEFAULT_RESHUFFLE_THRESHOLD, rng)
    }

    /// Build a full, shuffled shoe; validates deck count and threshold.
    pub fn try_new<R>(deck_count: usize, threshold: f64, rng: R) -> Result<Self, ShoeError>
    where
        R: RandomSource + Send + 'static,
    {
        if deck_count == 0 {
            return Err(ShoeError::InvalidDeckCount(deck_count));
        }
        validate_threshold(threshold)?;
        let mut shoe = Self {
            cards: VecDeque::with_capacity(deck_count * CARDS_PER_DECK),
            deck_count,
            penetration_threshold: threshold,
            auto_reshuffle: true,
            rng: Box::new(rng),
            events: Vec::new(),
        };
        shoe.reset();
        Ok(shoe)
    }

    pub fn with_config<R>(config: &GameConfig, rng: R) -> Result<Self, ShoeError>
    where
        R: RandomSource + Send + 'static,
    {
        Self::try_new(config.deck_count, config.penetration_threshold, rng)
    }

    pub fn deck_count(&self) -> usize {
        self.deck_count
    }

    pub fn penetration_threshold(&self) -> f64 {
        self.penetration_threshold
    }

    pub fn set_penetration_threshold(&mut self, threshold: f64) -> Result<(), ShoeError> {
        validate_threshold(threshold)?;
        self.penetration_threshold = threshold;
        Ok(())
    }

    pub fn auto_reshuffle(&self) -> bool {
        self.auto_reshuffle
    }

    /// Enable or disable reshuffle-needed notices after draws.
    pub fn set_auto_reshuffle(&mut self, enabled: bool) {
        self.auto_reshuffle = enabled;
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn total_cards(&self) -> usize {
        self.deck_count * CARDS_PER_DECK
    }

    pub fn cards_dealt(&self) -> usize {
        self.total_cards().saturating_sub(self.cards.len())
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remove and return the front card.
    ///
    /// After the removal, queues a reshuffle-needed notice if signaling is
    /// enabled and the shoe is now below its threshold.
    pub fn draw(&mut self) -> Result<Card, ShoeError> {
        let card = self.cards.pop_front().ok_or(ShoeError::Empty)?;
        if self.auto_reshuffle && self.remaining_percentage() < self.penetration_threshold {
            let notice = self.notice("penetration threshold reached");
            self.events.push(ShoeEvent::ReshuffleNeeded(notice));
        }
        Ok(card)
    }

    /// Cards still in the shoe, next to be drawn first.
    pub(crate) fn upcoming(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    /// Draw `n` cards; fails without removing anything if fewer remain.
    pub fn draw_n(&mut self, n: usize) -> Result<Vec<Card>, ShoeError> {
        if self.cards.len() < n {
            return Err(ShoeError::Empty);
        }
        (0..n).map(|_| self.draw()).collect()
    }

    /// Permute the current contents in place.
    pub fn shuffle(&mut self) {
        self.rng.shuffle(self.cards.make_contiguous());
    }

    /// Refill to `deck_count` full decks and shuffle.
    pub fn reset(&mut self) {
        self.cards.clear();
        let deck = standard_deck();
        for _ in 0..self.deck_count {
            self.cards.extend(deck.iter().copied());
        }
        self.shuffle();
    }

    /// Fraction of the full shoe still undealt, in `[0, 1]`.
    pub fn remaining_percentage(&self) -> f64 {
        let total = self.total_cards();
        if total == 0 {
            return 0.0;
        }
        self.cards.len() as f64 / total as f64
    }

    /// Strict comparison against [`DEFAULT_RESHUFFLE_THRESHOLD`].
    pub fn needs_reshuffle(&self) -> bool {
        self.needs_reshuffle_at(DEFAULT_RESHUFFLE_THRESHOLD)
    }

    /// True iff the remaining fraction is strictly below `threshold`.
    pub fn needs_reshuffle_at(&self, threshold: f64) -> bool {
        self.remaining_percentage() < threshold
    }

    /// Reset the shoe now and queue a [`ShoeEvent::Reshuffled`] notice.
    pub fn trigger_reshuffle(&mut self, reason: impl Into<String>) {
        self.reset();
        let notice = self.notice(reason);
        self.events.push(ShoeEvent::Reshuffled(notice));
    }

    pub fn pending_events(&self) -> &[ShoeEvent] {
        &self.events
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<ShoeEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg(test)]
    pub(crate) fn cards(&self) -> &VecDeque<Card> {
        &self.cards
    }

    fn notice(&self, reason: impl Into<String>) -> ReshuffleNotice {
        ReshuffleNotice {
            reason: reason.into(),
            remaining_percentage: self.remaining_percentage(),
            threshold: self.penetration_threshold,
            at: SystemTime::now(),
        }
    }
}

fn validate_threshold(threshold: f64) -> Result<(), ShoeError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ShoeError::InvalidThreshold(threshold));
    }
    Ok(())
}
