//! blackjack-rs: casino blackjack rules and state engine
//!
//! Goals:
//! - Exact scoring and outcome rules (soft/hard aces, naturals, pushes)
//! - Reproducible shoes through an injected [`rng::RandomSource`]
//! - No panics for invalid input; every failure is a `Result` and leaves
//!   state untouched
//!
//! ## Quick start: score hands and settle a bet
//! ```
//! use blackjack_rs::bet::Bet;
//! use blackjack_rs::hand::Hand;
//! use blackjack_rs::money::Money;
//! use blackjack_rs::rules::{determine_result, GameResult};
//!
//! let player: Hand = "As Kh".parse().unwrap();
//! let dealer: Hand = "Ts 7d".parse().unwrap();
//! let result = determine_result(&player, &dealer);
//! assert_eq!(result, GameResult::Blackjack);
//!
//! let bet = Bet::new(Money::from_units(10), "Ann").unwrap();
//! assert_eq!(bet.calculate_total_return(result).unwrap(), Money::from_units(25));
//! ```
//!
//! ## Simulation
//! Run automated rounds with:
//! ```sh
//! cargo run --bin blackjack-rs -- --rounds 1000 --seed 7
//! ```

pub mod agents;
pub mod bankroll;
pub mod bet;
pub mod cards;
pub mod config;
pub mod error;
pub mod hand;
pub mod money;
pub mod player;
pub mod player_hand;
pub mod rng;
pub mod rules;
pub mod shoe;
pub mod table;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
