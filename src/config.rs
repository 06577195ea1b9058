//! Table configuration.

use crate::bet::DEFAULT_BLACKJACK_MULTIPLIER;
use crate::error::ErrorKind;
use crate::money::Money;
use crate::player::DEFAULT_MAX_HANDS;
use crate::shoe::DEFAULT_RESHUFFLE_THRESHOLD;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("deck count must be at least 1")]
    NoDecks,
    #[error("penetration threshold must be within [0, 1], got {0}")]
    Threshold(f64),
    #[error("blackjack payout must be positive, got {0}")]
    Payout(f64),
    #[error("minimum bet must be positive")]
    ZeroMinimumBet,
    #[error("maximum bet {max} is below minimum bet {min}")]
    BetRange { min: Money, max: Money },
    #[error("players need room for at least one hand")]
    NoHands,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Rules and limits read once when a table is built.
///
/// ```
/// use blackjack_rs::config::GameConfig;
///
/// let config = GameConfig::default().with_deck_count(8).with_blackjack_payout(1.2);
/// assert_eq!(config.deck_count, 8);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub deck_count: usize,
    /// Remaining fraction of the shoe below which a reshuffle is requested.
    pub penetration_threshold: f64,
    /// Blackjack pays this many times the stake (1.5 is 3:2).
    pub blackjack_payout: f64,
    pub allow_double_down: bool,
    pub allow_split: bool,
    /// Upper bound on hands per player after splits.
    pub max_hands_per_player: usize,
    pub min_bet: Money,
    pub max_bet: Money,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_count: 6,
            penetration_threshold: DEFAULT_RESHUFFLE_THRESHOLD,
            blackjack_payout: DEFAULT_BLACKJACK_MULTIPLIER,
            allow_double_down: true,
            allow_split: true,
            max_hands_per_player: DEFAULT_MAX_HANDS,
            min_bet: Money::from_units(10),
            max_bet: Money::from_units(500),
        }
    }
}

impl GameConfig {
    #[must_use]
    pub const fn with_deck_count(mut self, decks: usize) -> Self {
        self.deck_count = decks;
        self
    }

    #[must_use]
    pub const fn with_penetration_threshold(mut self, threshold: f64) -> Self {
        self.penetration_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_blackjack_payout(mut self, payout: f64) -> Self {
        self.blackjack_payout = payout;
        self
    }

    #[must_use]
    pub const fn with_double_down(mut self, allowed: bool) -> Self {
        self.allow_double_down = allowed;
        self
    }

    #[must_use]
    pub const fn with_split(mut self, allowed: bool) -> Self {
        self.allow_split = allowed;
        self
    }

    #[must_use]
    pub const fn with_max_hands(mut self, max: usize) -> Self {
        self.max_hands_per_player = max;
        self
    }

    #[must_use]
    pub const fn with_bet_limits(mut self, min: Money, max: Money) -> Self {
        self.min_bet = min;
        self.max_bet = max;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deck_count == 0 {
            return Err(ConfigError::NoDecks);
        }
        if !(0.0..=1.0).contains(&self.penetration_threshold) {
            return Err(ConfigError::Threshold(self.penetration_threshold));
        }
        if !(self.blackjack_payout.is_finite() && self.blackjack_payout > 0.0) {
            return Err(ConfigError::Payout(self.blackjack_payout));
        }
        if self.min_bet.is_zero() {
            return Err(ConfigError::ZeroMinimumBet);
        }
        if self.max_bet < self.min_bet {
            return Err(ConfigError::BetRange { min: self.min_bet, max: self.max_bet });
        }
        if self.max_hands_per_player == 0 {
            return Err(ConfigError::NoHands);
        }
        Ok(())
    }
}
