//! Stateless rule evaluation: card contributions, dealer policy, action
//! eligibility and final outcomes.

use crate::cards::Card;
use crate::hand::{Hand, BLACKJACK};
use std::fmt;

/// Dealer stands on any total at or above this, soft 17 included.
pub const DEALER_STAND_TOTAL: u32 = 17;

/// Outcome of one player hand against the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GameResult {
    Win,
    Lose,
    Push,
    Blackjack,
}

impl GameResult {
    pub fn label(self) -> &'static str {
        match self {
            GameResult::Win => "Win",
            GameResult::Lose => "Lose",
            GameResult::Push => "Push",
            GameResult::Blackjack => "Blackjack",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PlayerAction {
    Hit,
    Stand,
    DoubleDown,
    Split,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 4] =
        [PlayerAction::Hit, PlayerAction::Stand, PlayerAction::DoubleDown, PlayerAction::Split];

    pub fn label(self) -> &'static str {
        match self {
            PlayerAction::Hit => "Hit",
            PlayerAction::Stand => "Stand",
            PlayerAction::DoubleDown => "Double down",
            PlayerAction::Split => "Split",
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What `card` adds to a hand currently totalling `current_total`.
///
/// An ace counts 11 when that keeps the total at or under 21, otherwise 1.
pub fn card_value_contribution(card: Card, current_total: u32) -> u32 {
    if card.is_ace() {
        if current_total + 11 <= BLACKJACK {
            11
        } else {
            1
        }
    } else {
        u32::from(card.rank().base_value())
    }
}

pub fn should_dealer_hit(dealer_value: u32) -> bool {
    dealer_value < DEALER_STAND_TOTAL
}

/// Compare a finished player hand with the finished dealer hand.
///
/// ```
/// use blackjack_rs::hand::Hand;
/// use blackjack_rs::rules::{determine_result, GameResult};
///
/// let player: Hand = "As Kd".parse().unwrap();
/// let dealer: Hand = "Ts 9h".parse().unwrap();
/// assert_eq!(determine_result(&player, &dealer), GameResult::Blackjack);
/// ```
pub fn determine_result(player: &Hand, dealer: &Hand) -> GameResult {
    if player.is_busted() {
        return GameResult::Lose;
    }
    let player_natural = player.is_blackjack();
    if dealer.is_busted() {
        return if player_natural { GameResult::Blackjack } else { GameResult::Win };
    }
    match (player_natural, dealer.is_blackjack()) {
        (true, true) => GameResult::Push,
        (true, false) => GameResult::Blackjack,
        (false, true) => GameResult::Lose,
        (false, false) => match player.value().cmp(&dealer.value()) {
            std::cmp::Ordering::Greater => GameResult::Win,
            std::cmp::Ordering::Less => GameResult::Lose,
            std::cmp::Ordering::Equal => GameResult::Push,
        },
    }
}

pub fn is_valid_player_action(action: PlayerAction, hand: &Hand) -> bool {
    if hand.is_busted() {
        return false;
    }
    match action {
        PlayerAction::Hit | PlayerAction::Stand => true,
        PlayerAction::DoubleDown => can_double_down(hand),
        PlayerAction::Split => can_split(hand),
    }
}

pub fn can_double_down(hand: &Hand) -> bool {
    !hand.is_busted() && hand.len() == 2
}

pub fn can_split(hand: &Hand) -> bool {
    !hand.is_busted() && hand.is_pair()
}

/// The actions `is_valid_player_action` accepts for `hand`, in table order.
pub fn valid_actions(hand: &Hand) -> Vec<PlayerAction> {
    PlayerAction::ALL.into_iter().filter(|a| is_valid_player_action(*a, hand)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn hand(s: &str) -> Hand {
        s.parse().unwrap()
    }

    #[test]
    fn ace_contribution_depends_on_total() {
        let ace = Card::new(Rank::Ace, Suit::Spades);
        assert_eq!(card_value_contribution(ace, 0), 11);
        assert_eq!(card_value_contribution(ace, 10), 11);
        assert_eq!(card_value_contribution(ace, 11), 1);
        assert_eq!(card_value_contribution(Card::new(Rank::Queen, Suit::Clubs), 5), 10);
        assert_eq!(card_value_contribution(Card::new(Rank::Four, Suit::Clubs), 5), 4);
    }

    #[test]
    fn dealer_stands_on_seventeen() {
        assert!(should_dealer_hit(16));
        assert!(!should_dealer_hit(17));
        assert!(!should_dealer_hit(21));
    }

    #[test]
    fn result_precedence() {
        // player bust loses even when dealer busts
        assert_eq!(determine_result(&hand("Ks Qh 5c"), &hand("Kd Qc 6s")), GameResult::Lose);
        assert_eq!(determine_result(&hand("As Kh"), &hand("Kd 6c 9s")), GameResult::Blackjack);
        assert_eq!(determine_result(&hand("9s 8h"), &hand("Kd 6c 9s")), GameResult::Win);
        assert_eq!(determine_result(&hand("As Kh"), &hand("Ad Qc")), GameResult::Push);
        assert_eq!(determine_result(&hand("As Kh"), &hand("Td 9c")), GameResult::Blackjack);
        assert_eq!(determine_result(&hand("7s 4h Kh"), &hand("Ad Qc")), GameResult::Lose);
        assert_eq!(determine_result(&hand("Ts 9h"), &hand("Td 8c")), GameResult::Win);
        assert_eq!(determine_result(&hand("Ts 7h"), &hand("Td 8c")), GameResult::Lose);
        assert_eq!(determine_result(&hand("Ts 8h"), &hand("9d 9c")), GameResult::Push);
    }

    #[test]
    fn action_eligibility() {
        let pair = hand("8s 8h");
        assert!(is_valid_player_action(PlayerAction::Split, &pair));
        assert!(is_valid_player_action(PlayerAction::DoubleDown, &pair));
        assert_eq!(valid_actions(&pair), PlayerAction::ALL.to_vec());

        let three = hand("2s 3h 4d");
        assert!(is_valid_player_action(PlayerAction::Hit, &three));
        assert!(!is_valid_player_action(PlayerAction::DoubleDown, &three));
        assert!(!can_split(&hand("Ks Qh")));

        let bust = hand("Ks Qh 5c");
        assert!(valid_actions(&bust).is_empty());
    }
}
