use crate::cards::{parse_cards, Card, CardParseError};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Blackjack target total.
pub const BLACKJACK: u32 = 21;

/// A scored hand: best total and whether an ace is still counted as 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub total: u32,
    pub soft: bool,
}

impl Score {
    /// Two-pass ace accounting.
    ///
    /// Every ace starts at 11 and every ten-valued card at 10; while the total
    /// is over 21 and an ace is still at 11, that ace drops to 1.
    pub fn of(cards: &[Card]) -> Self {
        let mut total = 0u32;
        let mut high_aces = 0u32;
        for card in cards {
            total += u32::from(card.rank().base_value());
            if card.is_ace() {
                high_aces += 1;
            }
        }
        while total > BLACKJACK && high_aces > 0 {
            total -= 10;
            high_aces -= 1;
        }
        Self { total, soft: high_aces > 0 }
    }
}

/// An ordered, growable set of cards with a lazily computed score.
///
/// ```
/// use blackjack_rs::cards::{Card, Rank, Suit};
/// use blackjack_rs::hand::Hand;
///
/// let mut hand = Hand::new();
/// hand.add_card(Card::new(Rank::Ace, Suit::Spades));
/// hand.add_card(Card::new(Rank::Six, Suit::Hearts));
/// assert_eq!(hand.value(), 17);
/// assert!(hand.is_soft());
///
/// hand.add_card(Card::new(Rank::Five, Suit::Clubs));
/// assert_eq!(hand.value(), 12);
/// assert!(!hand.is_soft());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
    is_split_hand: bool,
    is_complete: bool,
    // None whenever cards changed since the last read
    cached: Cell<Option<Score>>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<I>(cards: I) -> Self
    where
        I: IntoIterator<Item = Card>,
    {
        Self { cards: cards.into_iter().collect(), ..Self::default() }
    }

    /// A one-card hand produced by splitting a pair.
    pub fn split_from(card: Card) -> Self {
        Self { cards: vec![card], is_split_hand: true, ..Self::default() }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.cached.set(None);
    }

    /// Remove every card and reset the completion and split flags.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.is_split_hand = false;
        self.is_complete = false;
        self.cached.set(None);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self) -> Score {
        if let Some(score) = self.cached.get() {
            return score;
        }
        let score = Score::of(&self.cards);
        self.cached.set(Some(score));
        score
    }

    /// Best total not exceeding 21 when one exists, else the hard bust total.
    pub fn value(&self) -> u32 {
        self.score().total
    }

    pub fn is_busted(&self) -> bool {
        self.value() > BLACKJACK
    }

    /// Exactly two cards totalling 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == BLACKJACK
    }

    /// An ace still counts as 11. A natural is never reported soft.
    pub fn is_soft(&self) -> bool {
        self.score().soft && !self.is_blackjack()
    }

    pub fn is_split_hand(&self) -> bool {
        self.is_split_hand
    }

    pub fn is_split_aces(&self) -> bool {
        self.is_split_hand && self.cards.first().is_some_and(|c| c.is_ace())
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn mark_complete(&mut self) {
        self.is_complete = true;
    }

    pub fn can_receive_more_cards(&self) -> bool {
        if self.is_complete || self.is_busted() || self.is_blackjack() {
            return false;
        }
        // split aces take exactly one more card
        !(self.is_split_aces() && self.cards.len() >= 2)
    }

    /// Exactly two cards of the same rank. Ten-valued cards of different
    /// ranks (e.g. King + Queen) are not a pair.
    pub fn is_pair(&self) -> bool {
        matches!(self.cards.as_slice(), [a, b] if a.rank() == b.rank())
    }

    /// Split a pair into two one-card split hands, first card first.
    pub fn split_pair(&self) -> Option<(Hand, Hand)> {
        match self.cards.as_slice() {
            [a, b] if a.rank() == b.rank() => Some((Hand::split_from(*a), Hand::split_from(*b))),
            _ => None,
        }
    }
}

impl PartialEq for Hand {
    fn eq(&self, other: &Self) -> bool {
        self.cards == other.cards
            && self.is_split_hand == other.is_split_hand
            && self.is_complete == other.is_complete
    }
}

impl Eq for Hand {}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.cards.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        let score = self.score();
        if score.soft && !self.is_blackjack() {
            write!(f, " (soft {})", score.total)
        } else {
            write!(f, " ({})", score.total)
        }
    }
}

impl FromStr for Hand {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Hand::from_cards(parse_cards(s)?))
    }
}
