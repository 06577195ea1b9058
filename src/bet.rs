//! Wagers and payout arithmetic.
//!
//! A bet moves from active to settled exactly once. Payout and return
//! calculations are only defined while the bet is still open.

use crate::error::ErrorKind;
use crate::money::Money;
use crate::rules::GameResult;
use std::fmt;
use std::time::SystemTime;

pub const DEFAULT_BLACKJACK_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BetKind {
    Standard,
    DoubleDown,
    Split,
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetKind::Standard => "Standard",
            BetKind::DoubleDown => "DoubleDown",
            BetKind::Split => "Split",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BetError {
    #[error("bet amount must be positive")]
    NonPositiveAmount,
    #[error("player name must not be blank")]
    BlankPlayerName,
    #[error("blackjack multiplier must be positive, got {0}")]
    InvalidMultiplier(f64),
    #[error("bet is already settled")]
    AlreadySettled,
    #[error("only standard bets can be doubled or split, this one is {0}")]
    NotStandard(BetKind),
    #[error("bet amount {0} is too large to double")]
    AmountOverflow(Money),
}

impl BetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BetError::NonPositiveAmount
            | BetError::BlankPlayerName
            | BetError::InvalidMultiplier(_)
            | BetError::AmountOverflow(_) => ErrorKind::InvalidArgument,
            BetError::AlreadySettled | BetError::NotStandard(_) => ErrorKind::InvalidState,
        }
    }
}

/// A wager placed by one player on one hand.
///
/// ```
/// use blackjack_rs::bet::Bet;
/// use blackjack_rs::money::Money;
/// use blackjack_rs::rules::GameResult;
///
/// let bet = Bet::new(Money::from_units(10), "P").unwrap();
/// assert_eq!(bet.calculate_payout(GameResult::Blackjack, 1.5).unwrap(), Money::from_units(15));
/// assert_eq!(bet.calculate_total_return(GameResult::Push).unwrap(), Money::from_units(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bet {
    amount: Money,
    player_name: String,
    kind: BetKind,
    is_active: bool,
    is_settled: bool,
    placed_at: SystemTime,
}

impl Bet {
    /// A standard bet. The player name is trimmed.
    pub fn new(amount: Money, player_name: &str) -> Result<Self, BetError> {
        Self::with_kind(amount, player_name, BetKind::Standard)
    }

    fn with_kind(amount: Money, player_name: &str, kind: BetKind) -> Result<Self, BetError> {
        if amount.is_zero() {
            return Err(BetError::NonPositiveAmount);
        }
        let name = player_name.trim();
        if name.is_empty() {
            return Err(BetError::BlankPlayerName);
        }
        Ok(Self {
            amount,
            player_name: name.to_string(),
            kind,
            is_active: true,
            is_settled: false,
            placed_at: SystemTime::now(),
        })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn kind(&self) -> BetKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_settled(&self) -> bool {
        self.is_settled
    }

    pub fn placed_at(&self) -> SystemTime {
        self.placed_at
    }

    /// Winnings on top of the returned stake.
    ///
    /// Win pays 1:1, Blackjack pays `multiplier`:1, Push and Lose pay nothing.
    pub fn calculate_payout(&self, result: GameResult, multiplier: f64) -> Result<Money, BetError> {
        self.ensure_open()?;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(BetError::InvalidMultiplier(multiplier));
        }
        Ok(match result {
            GameResult::Win => self.amount,
            GameResult::Blackjack => self.amount.scale(multiplier),
            GameResult::Push | GameResult::Lose => Money::ZERO,
        })
    }

    /// Stake plus payout using the default 3:2 blackjack multiplier.
    pub fn calculate_total_return(&self, result: GameResult) -> Result<Money, BetError> {
        self.calculate_total_return_with(result, DEFAULT_BLACKJACK_MULTIPLIER)
    }

    /// Stake plus payout; a lost bet returns nothing.
    pub fn calculate_total_return_with(
        &self,
        result: GameResult,
        multiplier: f64,
    ) -> Result<Money, BetError> {
        let payout = self.calculate_payout(result, multiplier)?;
        Ok(match result {
            GameResult::Lose => Money::ZERO,
            _ => self.amount + payout,
        })
    }

    pub fn settle(&mut self) -> Result<(), BetError> {
        self.ensure_open()?;
        self.is_settled = true;
        self.is_active = false;
        Ok(())
    }

    /// A new bet for twice this bet's amount.
    pub fn create_double_down_bet(&self) -> Result<Bet, BetError> {
        self.ensure_derivable()?;
        let doubled = self.amount.checked_mul(2).ok_or(BetError::AmountOverflow(self.amount))?;
        Self::with_kind(doubled, &self.player_name, BetKind::DoubleDown)
    }

    /// A new bet of the same amount for the second hand of a split.
    pub fn create_split_bet(&self) -> Result<Bet, BetError> {
        self.ensure_derivable()?;
        Self::with_kind(self.amount, &self.player_name, BetKind::Split)
    }

    fn ensure_open(&self) -> Result<(), BetError> {
        if self.is_settled {
            return Err(BetError::AlreadySettled);
        }
        Ok(())
    }

    fn ensure_derivable(&self) -> Result<(), BetError> {
        self.ensure_open()?;
        if self.kind != BetKind::Standard {
            return Err(BetError::NotStandard(self.kind));
        }
        Ok(())
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.player_name, self.amount, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> Bet {
        Bet::new(Money::from_units(10), "P").unwrap()
    }

    #[test]
    fn construction_validates_inputs() {
        assert_eq!(Bet::new(Money::ZERO, "P").unwrap_err(), BetError::NonPositiveAmount);
        assert_eq!(Bet::new(Money::from_units(1), "   ").unwrap_err(), BetError::BlankPlayerName);
        let b = Bet::new(Money::from_units(1), "  Ann  ").unwrap();
        assert_eq!(b.player_name(), "Ann");
        assert_eq!(b.kind(), BetKind::Standard);
        assert!(b.is_active());
        assert!(!b.is_settled());
    }

    #[test]
    fn payouts_per_result() {
        let b = ten();
        assert_eq!(b.calculate_payout(GameResult::Win, 1.5).unwrap(), Money::from_units(10));
        assert_eq!(b.calculate_payout(GameResult::Blackjack, 1.5).unwrap(), Money::from_units(15));
        assert_eq!(b.calculate_payout(GameResult::Push, 1.5).unwrap(), Money::ZERO);
        assert_eq!(b.calculate_payout(GameResult::Lose, 1.5).unwrap(), Money::ZERO);
        assert_eq!(b.calculate_total_return(GameResult::Blackjack).unwrap(), Money::from_units(25));
        assert_eq!(b.calculate_total_return(GameResult::Win).unwrap(), Money::from_units(20));
        assert_eq!(b.calculate_total_return(GameResult::Push).unwrap(), Money::from_units(10));
        assert_eq!(b.calculate_total_return(GameResult::Lose).unwrap(), Money::ZERO);
    }

    #[test]
    fn multiplier_must_be_positive() {
        let b = ten();
        assert!(matches!(
            b.calculate_payout(GameResult::Win, 0.0),
            Err(BetError::InvalidMultiplier(_))
        ));
        assert!(b.calculate_payout(GameResult::Win, -1.0).is_err());
        assert!(b.calculate_payout(GameResult::Win, f64::NAN).is_err());
    }

    #[test]
    fn settle_is_one_way() {
        let mut b = ten();
        b.settle().unwrap();
        assert!(b.is_settled());
        assert!(!b.is_active());
        let err = b.settle().unwrap_err();
        assert_eq!(err, BetError::AlreadySettled);
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(b.calculate_payout(GameResult::Win, 1.5).is_err());
        assert!(b.calculate_total_return(GameResult::Push).is_err());
    }

    #[test]
    fn derived_bets() {
        let b = ten();
        let dd = b.create_double_down_bet().unwrap();
        assert_eq!(dd.amount(), Money::from_units(20));
        assert_eq!(dd.kind(), BetKind::DoubleDown);
        let split = b.create_split_bet().unwrap();
        assert_eq!(split.amount(), Money::from_units(10));
        assert_eq!(split.kind(), BetKind::Split);
        assert_eq!(split.player_name(), "P");

        assert_eq!(split.create_split_bet().unwrap_err(), BetError::NotStandard(BetKind::Split));
        assert!(dd.create_double_down_bet().is_err());

        let mut settled = ten();
        settled.settle().unwrap();
        assert_eq!(settled.create_split_bet().unwrap_err(), BetError::AlreadySettled);
    }

    #[test]
    fn doubling_a_huge_bet_is_refused() {
        let huge = Money::from_cents(u64::MAX / 2 + 1);
        let b = Bet::new(huge, "P").unwrap();
        let err = b.create_double_down_bet().unwrap_err();
        assert_eq!(err, BetError::AmountOverflow(huge));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        // payouts saturate rather than wrap
        let max = Bet::new(Money::from_cents(u64::MAX), "P").unwrap();
        assert_eq!(
            max.calculate_total_return(GameResult::Win).unwrap(),
            Money::from_cents(u64::MAX)
        );
    }
}
