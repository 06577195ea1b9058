//! Per-player hand bookkeeping across splits.
//!
//! A player starts a round with at most one hand. Splitting replaces the
//! current hand with the first half of the pair and inserts the second half
//! directly after it, so hands are always played left to right. The cursor
//! either points at the hand receiving actions or one past the end once every
//! hand has been visited.

use crate::bankroll::Bankroll;
use crate::money::Money;
use crate::player_hand::{PlayError, PlayerHand};
use crate::rules;

pub const DEFAULT_MAX_HANDS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiHandPlayer {
    name: String,
    hands: Vec<PlayerHand>,
    current: usize,
    max_hands: usize,
}

impl MultiHandPlayer {
    pub fn new(name: impl Into<String>, max_hands: usize) -> Self {
        Self { name: name.into(), hands: Vec::new(), current: 0, max_hands: max_hands.max(1) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_hands(&self) -> usize {
        self.max_hands
    }

    pub fn hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    pub fn hand(&self, index: usize) -> Option<&PlayerHand> {
        self.hands.get(index)
    }

    pub(crate) fn hands_mut(&mut self) -> &mut [PlayerHand] {
        &mut self.hands
    }

    /// Begin the round with its initial hand.
    pub fn start_hand(&mut self, hand: PlayerHand) -> Result<(), PlayError> {
        if !self.hands.is_empty() {
            return Err(PlayError::HandAlreadyStarted);
        }
        self.hands.push(hand);
        self.current = 0;
        Ok(())
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_hand(&self) -> Option<&PlayerHand> {
        self.hands.get(self.current)
    }

    pub fn current_hand_mut(&mut self) -> Option<&mut PlayerHand> {
        self.hands.get_mut(self.current)
    }

    /// True once the cursor is past the last hand.
    pub fn is_finished(&self) -> bool {
        self.current >= self.hands.len()
    }

    pub fn all_complete(&self) -> bool {
        self.hands.iter().all(PlayerHand::is_complete)
    }

    pub fn total_wagered(&self) -> Money {
        self.hands.iter().map(|h| h.bet().amount()).sum()
    }

    /// First active hand at or after `from`.
    pub fn next_active_index(&self, from: usize) -> Option<usize> {
        self.hands.iter().enumerate().skip(from).find(|(_, h)| h.is_active()).map(|(i, _)| i)
    }

    /// Park the current hand if it is still active and move to the next
    /// active one. Returns false once no active hand remains ahead.
    pub fn advance_to_next_hand(&mut self) -> bool {
        if let Some(h) = self.hands.get_mut(self.current) {
            h.deactivate();
        }
        match self.next_active_index(self.current + 1) {
            Some(i) => {
                self.current = i;
                true
            }
            None => {
                self.current = self.hands.len();
                false
            }
        }
    }

    /// Split the current pair into two hands, the second with its own bet.
    ///
    /// The split bet's amount is withdrawn from `bankroll`. Nothing changes
    /// if any check fails.
    pub fn split_current_hand(&mut self, bankroll: &mut dyn Bankroll) -> Result<(), PlayError> {
        let idx = self.current;
        let current = self.hands.get(idx).ok_or(PlayError::NoCurrentHand)?;
        if current.is_complete() {
            return Err(PlayError::HandComplete);
        }
        if !current.is_active() {
            return Err(PlayError::HandNotActive);
        }
        if !rules::can_split(current.hand()) {
            return Err(PlayError::CannotSplit);
        }
        if self.hands.len() >= self.max_hands {
            return Err(PlayError::HandLimit { max: self.max_hands });
        }
        let (first, second) = current.hand().split_pair().ok_or(PlayError::CannotSplit)?;
        let split_bet = current.bet().create_split_bet()?;
        bankroll.withdraw(split_bet.amount())?;

        self.hands[idx].replace_hand(first);
        self.hands.insert(idx + 1, PlayerHand::new(second, split_bet));
        Ok(())
    }

    /// Cursor back to the first hand; every unfinished hand becomes active.
    pub fn reset_to_first_hand(&mut self) {
        self.current = 0;
        for h in &mut self.hands {
            h.activate();
        }
    }

    /// Drop all hands ahead of the next round.
    pub fn clear(&mut self) {
        self.hands.clear();
        self.current = 0;
    }
}
