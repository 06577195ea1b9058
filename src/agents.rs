//! Agents: pluggable automated players.
//!
//! `PlayerAgent` picks an action from what the table currently allows;
//! `AgentTable` maps seats to agents and drives the table through player
//! turns until a seat without an agent has to act or every hand is done.

use crate::cards::Card;
use crate::hand::Hand;
use crate::money::Money;
use crate::player_hand::PlayerHand;
use crate::rules::{PlayerAction, DEALER_STAND_TOTAL};
use crate::table::{Table, TableError};
use core::fmt;
use tracing::warn;

/// What an agent sees when it is asked to act.
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub seat: usize,
    pub hand: &'a PlayerHand,
    pub dealer_up: Option<Card>,
    pub allowed: &'a [PlayerAction],
    pub balance: Money,
}

impl TurnView<'_> {
    pub fn allows(&self, action: PlayerAction) -> bool {
        self.allowed.contains(&action)
    }
}

pub trait PlayerAgent {
    /// Choose one of `view.allowed`.
    fn decide(&mut self, view: &TurnView<'_>) -> PlayerAction;

    fn label(&self) -> &'static str {
        "agent"
    }
}

/// Hits below 17 like the dealer; never doubles or splits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealerMimicAgent;

impl PlayerAgent for DealerMimicAgent {
    fn decide(&mut self, view: &TurnView<'_>) -> PlayerAction {
        if view.hand.hand_value() < DEALER_STAND_TOTAL && view.allows(PlayerAction::Hit) {
            PlayerAction::Hit
        } else {
            PlayerAction::Stand
        }
    }

    fn label(&self) -> &'static str {
        "dealer-mimic"
    }
}

/// Multi-deck basic strategy, dealer stands on all 17s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStrategyAgent;

impl PlayerAgent for BasicStrategyAgent {
    fn decide(&mut self, view: &TurnView<'_>) -> PlayerAction {
        let Some(up) = view.dealer_up else {
            return PlayerAction::Stand;
        };
        basic_strategy(view.hand.hand(), up, view.allowed)
    }

    fn label(&self) -> &'static str {
        "basic-strategy"
    }
}

#[derive(Clone, Copy)]
enum Play {
    Hit,
    Stand,
    /// Double if allowed, otherwise hit.
    DoubleOrHit,
    /// Double if allowed, otherwise stand.
    DoubleOrStand,
}

/// Basic strategy decision for `hand` against the dealer's up-card,
/// restricted to `allowed`.
pub fn basic_strategy(hand: &Hand, up: Card, allowed: &[PlayerAction]) -> PlayerAction {
    let up = u32::from(up.rank().base_value());
    if allowed.contains(&PlayerAction::Split) && should_split(hand, up) {
        return PlayerAction::Split;
    }
    let total = hand.value();
    let play = if hand.is_soft() { soft_play(total, up) } else { hard_play(total, up) };
    let can = |a: PlayerAction| allowed.contains(&a);
    let chosen = match play {
        Play::Hit => PlayerAction::Hit,
        Play::Stand => PlayerAction::Stand,
        Play::DoubleOrHit if can(PlayerAction::DoubleDown) => PlayerAction::DoubleDown,
        Play::DoubleOrHit => PlayerAction::Hit,
        Play::DoubleOrStand if can(PlayerAction::DoubleDown) => PlayerAction::DoubleDown,
        Play::DoubleOrStand => PlayerAction::Stand,
    };
    if chosen == PlayerAction::Hit && !can(PlayerAction::Hit) {
        return PlayerAction::Stand;
    }
    chosen
}

fn should_split(hand: &Hand, up: u32) -> bool {
    let Some(first) = hand.cards().first() else {
        return false;
    };
    if !hand.is_pair() {
        return false;
    }
    match first.rank().base_value() {
        11 | 8 => true,
        10 | 5 => false,
        9 => matches!(up, 2..=6 | 8 | 9),
        7 | 3 | 2 => (2..=7).contains(&up),
        6 => (2..=6).contains(&up),
        4 => matches!(up, 5 | 6),
        _ => false,
    }
}

fn soft_play(total: u32, up: u32) -> Play {
    match total {
        19.. => Play::Stand,
        18 => match up {
            3..=6 => Play::DoubleOrStand,
            2 | 7 | 8 => Play::Stand,
            _ => Play::Hit,
        },
        17 if (3..=6).contains(&up) => Play::DoubleOrHit,
        15 | 16 if (4..=6).contains(&up) => Play::DoubleOrHit,
        13 | 14 if (5..=6).contains(&up) => Play::DoubleOrHit,
        _ => Play::Hit,
    }
}

fn hard_play(total: u32, up: u32) -> Play {
    match total {
        17.. => Play::Stand,
        13..=16 if up <= 6 => Play::Stand,
        12 if (4..=6).contains(&up) => Play::Stand,
        11 if up <= 10 => Play::DoubleOrHit,
        10 if up <= 9 => Play::DoubleOrHit,
        9 if (3..=6).contains(&up) => Play::DoubleOrHit,
        _ => Play::Hit,
    }
}

/// Manages a set of optional agents, one per seat.
pub struct AgentTable {
    seats: Vec<Option<Box<dyn PlayerAgent>>>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String =
            self.seats.iter().map(|a| if a.is_some() { 'B' } else { '-' }).collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table with `n` seats, all empty.
    pub fn for_seats(n: usize) -> Self {
        let mut seats = Vec::with_capacity(n);
        seats.resize_with(n, || None);
        Self { seats }
    }

    pub fn set_agent(&mut self, seat: usize, agent: Box<dyn PlayerAgent>) {
        if self.seats.len() <= seat {
            self.seats.resize_with(seat + 1, || None);
        }
        self.seats[seat] = Some(agent);
    }

    pub fn clear_agent(&mut self, seat: usize) {
        if let Some(slot) = self.seats.get_mut(seat) {
            *slot = None;
        }
    }

    pub fn has_agent(&self, seat: usize) -> bool {
        matches!(self.seats.get(seat), Some(Some(_)))
    }

    /// Play agent seats until player turns end (`Ok(true)`) or a seat with no
    /// agent is up (`Ok(false)`).
    pub fn drive(&mut self, table: &mut Table) -> Result<bool, TableError> {
        while let Some(seat) = table.current_seat() {
            let Some(agent) = self.seats.get_mut(seat).and_then(|a| a.as_mut()) else {
                return Ok(false);
            };
            let allowed = table.allowed_actions();
            let action = {
                let Some(hand) = table.current_hand() else {
                    return Ok(false);
                };
                let view = TurnView {
                    seat,
                    hand,
                    dealer_up: table.dealer_up_card(),
                    allowed: &allowed,
                    balance: table.seats()[seat].balance(),
                };
                agent.decide(&view)
            };
            let action = if allowed.contains(&action) {
                action
            } else {
                warn!(seat, agent = agent.label(), %action, "agent chose a disallowed action, standing");
                PlayerAction::Stand
            };
            table.apply(action)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn hand(s: &str) -> Hand {
        s.parse().unwrap()
    }

    fn up(r: Rank) -> Card {
        Card::new(r, Suit::Diamonds)
    }

    const ALL: &[PlayerAction] = &PlayerAction::ALL;
    const NO_DOUBLE: &[PlayerAction] = &[PlayerAction::Hit, PlayerAction::Stand];

    #[test]
    fn pairs() {
        assert_eq!(basic_strategy(&hand("8s 8h"), up(Rank::Ten), ALL), PlayerAction::Split);
        assert_eq!(basic_strategy(&hand("As Ah"), up(Rank::Six), ALL), PlayerAction::Split);
        assert_eq!(basic_strategy(&hand("Ts Th"), up(Rank::Six), ALL), PlayerAction::Stand);
        assert_eq!(basic_strategy(&hand("5s 5h"), up(Rank::Six), ALL), PlayerAction::DoubleDown);
        // no split allowed: 8-8 is a hard 16
        assert_eq!(basic_strategy(&hand("8s 8h"), up(Rank::Ten), NO_DOUBLE), PlayerAction::Hit);
    }

    #[test]
    fn hard_totals() {
        assert_eq!(basic_strategy(&hand("Ts 7h"), up(Rank::Ace), ALL), PlayerAction::Stand);
        assert_eq!(basic_strategy(&hand("Ts 6h"), up(Rank::Six), ALL), PlayerAction::Stand);
        assert_eq!(basic_strategy(&hand("Ts 6h"), up(Rank::Seven), ALL), PlayerAction::Hit);
        assert_eq!(basic_strategy(&hand("6s 5h"), up(Rank::Nine), ALL), PlayerAction::DoubleDown);
        assert_eq!(basic_strategy(&hand("6s 5h"), up(Rank::Nine), NO_DOUBLE), PlayerAction::Hit);
        assert_eq!(basic_strategy(&hand("6s 5h"), up(Rank::Ace), ALL), PlayerAction::Hit);
    }

    #[test]
    fn soft_totals() {
        assert_eq!(basic_strategy(&hand("As 7h"), up(Rank::Five), ALL), PlayerAction::DoubleDown);
        assert_eq!(basic_strategy(&hand("As 7h"), up(Rank::Five), NO_DOUBLE), PlayerAction::Stand);
        assert_eq!(basic_strategy(&hand("As 7h"), up(Rank::Ten), ALL), PlayerAction::Hit);
        assert_eq!(basic_strategy(&hand("As 8h"), up(Rank::Ten), ALL), PlayerAction::Stand);
    }

    #[test]
    fn agent_table_debug_lists_seats() {
        let mut agents = AgentTable::for_seats(2);
        agents.set_agent(1, Box::new(BasicStrategyAgent));
        assert_eq!(format!("{agents:?}"), "AgentTable(-B)");
        assert!(agents.has_agent(1));
        agents.clear_agent(1);
        assert!(!agents.has_agent(1));
    }
}
