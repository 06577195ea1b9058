use blackjack_rs::cards::{Card, Rank, Suit};
use blackjack_rs::hand::Hand;
use blackjack_rs::rules::{card_value_contribution, determine_result, GameResult};
use proptest::prelude::*;

fn any_rank() -> impl Strategy<Value = Rank> {
    (0usize..13).prop_map(|i| Rank::ALL[i])
}

fn any_suit() -> impl Strategy<Value = Suit> {
    prop_oneof![Just(Suit::Spades), Just(Suit::Hearts), Just(Suit::Diamonds), Just(Suit::Clubs)]
}

fn any_card() -> impl Strategy<Value = Card> {
    (any_rank(), any_suit()).prop_map(|(r, s)| Card::new(r, s))
}

// Best total over every 1/11 choice per ace: highest <= 21, else all aces at 1.
fn brute_force_value(cards: &[Card]) -> u32 {
    let hard: u32 = cards.iter().map(|c| if c.is_ace() { 1 } else { u32::from(c.rank().base_value()) }).sum();
    let aces = cards.iter().filter(|c| c.is_ace()).count() as u32;
    (0..=aces).map(|high| hard + 10 * high).filter(|v| *v <= 21).max().unwrap_or(hard)
}

fn hand(s: &str) -> Hand {
    s.parse().unwrap()
}

#[test]
fn empty_hand_scores_zero() {
    assert_eq!(Hand::new().value(), 0);
}

#[test]
fn soft_seventeen_becomes_hard_twelve() {
    let mut h = hand("As 6d");
    assert_eq!(h.value(), 17);
    assert!(h.is_soft());
    h.add_card(Card::new(Rank::Five, Suit::Hearts));
    assert_eq!(h.value(), 12);
    assert!(!h.is_soft());
}

#[test]
fn king_queen_five_busts_at_25() {
    let h = hand("Kc Qd 5s");
    assert!(h.is_busted());
    assert_eq!(h.value(), 25);
}

#[test]
fn incremental_contribution_matches_simple_hands() {
    // without later ace demotion the running contribution equals the hand value
    let cards = [
        Card::new(Rank::Nine, Suit::Clubs),
        Card::new(Rank::Ace, Suit::Hearts),
        Card::new(Rank::Ace, Suit::Spades),
    ];
    let mut running = 0;
    for c in cards {
        running += card_value_contribution(c, running);
    }
    assert_eq!(running, 21);
    assert_eq!(Hand::from_cards(cards).value(), 21);
}

#[test]
fn twenty_one_with_three_cards_is_not_a_natural() {
    let three = hand("7s 7h 7d");
    assert_eq!(three.value(), 21);
    assert!(!three.is_blackjack());
    assert_eq!(determine_result(&three, &hand("As Kd")), GameResult::Lose);
    assert_eq!(determine_result(&hand("As Kd"), &three), GameResult::Blackjack);
}

proptest! {
    #[test]
    fn value_is_best_ace_assignment(cards in prop::collection::vec(any_card(), 0..8)) {
        let h = Hand::from_cards(cards.iter().copied());
        prop_assert_eq!(h.value(), brute_force_value(&cards));
    }

    #[test]
    fn blackjack_iff_two_cards_totalling_21(cards in prop::collection::vec(any_card(), 0..5)) {
        let h = Hand::from_cards(cards.iter().copied());
        prop_assert_eq!(h.is_blackjack(), cards.len() == 2 && h.value() == 21);
    }

    #[test]
    fn soft_means_an_ace_still_counts_eleven(cards in prop::collection::vec(any_card(), 0..8)) {
        let h = Hand::from_cards(cards.iter().copied());
        let hard: u32 = cards.iter().map(|c| if c.is_ace() { 1 } else { u32::from(c.rank().base_value()) }).sum();
        let expected = h.value() != hard && !h.is_blackjack();
        prop_assert_eq!(h.is_soft(), expected);
        prop_assert_eq!(h.is_busted(), h.value() > 21);
    }

    #[test]
    fn reads_are_stable_between_mutations(cards in prop::collection::vec(any_card(), 1..6), extra in any_card()) {
        let mut h = Hand::from_cards(cards.iter().copied());
        let first = h.value();
        prop_assert_eq!(h.value(), first);
        h.add_card(extra);
        let mut all = cards.clone();
        all.push(extra);
        prop_assert_eq!(h.value(), brute_force_value(&all));
    }

    #[test]
    fn busted_player_always_loses(cards in prop::collection::vec(any_card(), 3..8), dealer in prop::collection::vec(any_card(), 2..6)) {
        let player = Hand::from_cards(cards);
        let dealer = Hand::from_cards(dealer);
        if player.is_busted() {
            prop_assert_eq!(determine_result(&player, &dealer), GameResult::Lose);
        }
    }
}
