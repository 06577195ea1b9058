use crate::bankroll::{Bankroll, BankrollError};
use crate::bet::{Bet, BetError};
use crate::cards::Card;
use crate::error::ErrorKind;
use crate::hand::Hand;
use crate::money::Money;
use crate::rules::{self, GameResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HandStatus {
    /// Receiving actions.
    Active,
    /// Unfinished, waiting for the turn to come back.
    Inactive,
    /// Terminal.
    Complete,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlayError {
    #[error("player has no current hand")]
    NoCurrentHand,
    #[error("player already holds a hand for this round")]
    HandAlreadyStarted,
    #[error("hand is complete")]
    HandComplete,
    #[error("hand is not active")]
    HandNotActive,
    #[error("hand cannot receive more cards")]
    CannotReceiveCard,
    #[error("hand is not eligible to split")]
    CannotSplit,
    #[error("hand is not eligible to double down")]
    CannotDoubleDown,
    #[error("hand limit of {max} reached")]
    HandLimit { max: usize },
    #[error(transparent)]
    Bankroll(#[from] BankrollError),
    #[error(transparent)]
    Bet(#[from] BetError),
}

impl PlayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlayError::NoCurrentHand
            | PlayError::HandAlreadyStarted
            | PlayError::HandComplete
            | PlayError::HandNotActive
            | PlayError::CannotReceiveCard => ErrorKind::InvalidState,
            PlayError::CannotSplit | PlayError::CannotDoubleDown | PlayError::HandLimit { .. } => {
                ErrorKind::InvalidAction
            }
            PlayError::Bankroll(e) => e.kind(),
            PlayError::Bet(e) => e.kind(),
        }
    }
}

/// One hand and the bet riding on it.
///
/// The hand completes itself as soon as a card busts it, makes a natural, or
/// gives a split ace its single extra card.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHand {
    hand: Hand,
    bet: Bet,
    status: HandStatus,
}

impl PlayerHand {
    pub fn new(hand: Hand, bet: Bet) -> Self {
        Self { hand, bet, status: HandStatus::Active }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn bet(&self) -> &Bet {
        &self.bet
    }

    pub fn status(&self) -> HandStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == HandStatus::Active
    }

    pub fn is_complete(&self) -> bool {
        self.status == HandStatus::Complete
    }

    pub fn hand_value(&self) -> u32 {
        self.hand.value()
    }

    /// Whether [`PlayerHand::add_card`] would accept a card right now.
    pub fn check_can_take_card(&self) -> Result<(), PlayError> {
        self.ensure_active()?;
        if !self.hand.can_receive_more_cards() {
            return Err(PlayError::CannotReceiveCard);
        }
        Ok(())
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), PlayError> {
        self.check_can_take_card()?;
        self.hand.add_card(card);
        self.refresh_completion();
        Ok(())
    }

    /// Whether [`PlayerHand::stand`] would succeed right now.
    pub fn check_can_stand(&self) -> Result<(), PlayError> {
        self.ensure_active()
    }

    pub fn stand(&mut self) -> Result<(), PlayError> {
        self.ensure_active()?;
        self.complete();
        Ok(())
    }

    /// Everything [`PlayerHand::double_down`] checks, without mutating.
    pub fn check_double_down(&self, bankroll: &dyn Bankroll) -> Result<Bet, PlayError> {
        self.ensure_active()?;
        if !rules::can_double_down(&self.hand) || !self.hand.can_receive_more_cards() {
            return Err(PlayError::CannotDoubleDown);
        }
        let doubled = self.bet.create_double_down_bet()?;
        let extra = doubled.amount().saturating_sub(self.bet.amount());
        if !bankroll.can_cover(extra) {
            return Err(BankrollError::InsufficientFunds {
                needed: extra,
                available: bankroll.balance(),
            }
            .into());
        }
        Ok(doubled)
    }

    /// Swap in the doubled bet, take the extra stake from `bankroll`, add
    /// exactly one card and complete the hand.
    pub fn double_down(&mut self, card: Card, bankroll: &mut dyn Bankroll) -> Result<(), PlayError> {
        let doubled = self.check_double_down(bankroll)?;
        let extra = doubled.amount().saturating_sub(self.bet.amount());
        bankroll.withdraw(extra)?;
        self.bet = doubled;
        self.hand.add_card(card);
        self.complete();
        Ok(())
    }

    /// Total return for `result`, then settle the bet.
    pub fn settle(&mut self, result: GameResult, multiplier: f64) -> Result<Money, BetError> {
        let total = self.bet.calculate_total_return_with(result, multiplier)?;
        self.bet.settle()?;
        Ok(total)
    }

    pub fn activate(&mut self) {
        if !self.is_complete() {
            self.status = HandStatus::Active;
        }
    }

    pub fn deactivate(&mut self) {
        if self.is_active() {
            self.status = HandStatus::Inactive;
        }
    }

    pub fn complete(&mut self) {
        self.status = HandStatus::Complete;
        self.hand.mark_complete();
    }

    pub(crate) fn replace_hand(&mut self, hand: Hand) {
        self.hand = hand;
    }

    fn refresh_completion(&mut self) {
        let h = &self.hand;
        if h.is_busted() || h.is_blackjack() || (h.is_split_aces() && h.len() == 2) {
            self.complete();
        }
    }

    fn ensure_active(&self) -> Result<(), PlayError> {
        match self.status {
            HandStatus::Active => Ok(()),
            HandStatus::Inactive => Err(PlayError::HandNotActive),
            HandStatus::Complete => Err(PlayError::HandComplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bankroll::Wallet;
    use crate::bet::BetKind;
    use crate::cards::{Rank, Suit};

    fn ph(cards: &str) -> PlayerHand {
        PlayerHand::new(cards.parse().unwrap(), Bet::new(Money::from_units(10), "P").unwrap())
    }

    fn card(r: Rank) -> Card {
        Card::new(r, Suit::Clubs)
    }

    #[test]
    fn busting_card_completes_the_hand() {
        let mut h = ph("Ks 6h");
        h.add_card(card(Rank::Nine)).unwrap();
        assert!(h.is_complete());
        assert!(h.hand().is_busted());
        assert_eq!(h.add_card(card(Rank::Two)).unwrap_err(), PlayError::HandComplete);
    }

    #[test]
    fn natural_completes_on_second_card() {
        let mut h = ph("As");
        h.add_card(card(Rank::King)).unwrap();
        assert!(h.is_complete());
    }

    #[test]
    fn split_ace_completes_after_one_card() {
        let mut h = PlayerHand::new(
            Hand::split_from(Card::new(Rank::Ace, Suit::Spades)),
            Bet::new(Money::from_units(10), "P").unwrap(),
        );
        h.add_card(card(Rank::Five)).unwrap();
        assert!(h.is_complete());
        assert_eq!(h.hand_value(), 16);
    }

    #[test]
    fn inactive_hand_refuses_actions() {
        let mut h = ph("5s 6h");
        h.deactivate();
        assert_eq!(h.status(), HandStatus::Inactive);
        let err = h.stand().unwrap_err();
        assert_eq!(err, PlayError::HandNotActive);
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        h.activate();
        h.stand().unwrap();
        h.activate();
        assert!(h.is_complete());
    }

    #[test]
    fn double_down_swaps_bet_and_takes_one_card() {
        let mut wallet = Wallet::new(Money::from_units(100));
        let mut h = ph("5s 6h");
        h.double_down(card(Rank::Two), &mut wallet).unwrap();
        assert!(h.is_complete());
        assert_eq!(h.hand().len(), 3);
        assert_eq!(h.bet().kind(), BetKind::DoubleDown);
        assert_eq!(h.bet().amount(), Money::from_units(20));
        assert_eq!(wallet.balance(), Money::from_units(90));
    }

    #[test]
    fn failed_double_down_changes_nothing() {
        let mut poor = Wallet::new(Money::from_units(5));
        let mut h = ph("5s 6h");
        let err = h.double_down(card(Rank::Two), &mut poor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
        assert_eq!(h.hand().len(), 2);
        assert_eq!(h.bet().kind(), BetKind::Standard);
        assert_eq!(poor.balance(), Money::from_units(5));

        let mut rich = Wallet::new(Money::from_units(100));
        let mut three = ph("2s 3h 4d");
        assert_eq!(
            three.double_down(card(Rank::Two), &mut rich).unwrap_err(),
            PlayError::CannotDoubleDown
        );
    }

    #[test]
    fn settle_returns_stake_plus_payout_once() {
        let mut h = ph("Ts 9h");
        assert_eq!(h.settle(GameResult::Win, 1.5).unwrap(), Money::from_units(20));
        assert!(h.bet().is_settled());
        assert_eq!(h.settle(GameResult::Win, 1.5).unwrap_err(), BetError::AlreadySettled);
    }
}
