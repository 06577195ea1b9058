//! Round orchestration: bets, deal, player turns, dealer play, settlement.
//!
//! A `Table` owns the shoe and every seat's hands and wallet, and walks a
//! round through its phases. Invalid requests return an error and leave the
//! table as it was. Reshuffles requested by the shoe are only carried out in
//! [`Table::new_round`], never while a round is in progress.

use crate::bankroll::{Bankroll, BankrollError, Wallet};
use crate::bet::{Bet, BetError};
use crate::cards::Card;
use crate::config::{ConfigError, GameConfig};
use crate::error::ErrorKind;
use crate::hand::Hand;
use crate::money::Money;
use crate::player::MultiHandPlayer;
use crate::player_hand::{PlayError, PlayerHand};
use crate::rng::RandomSource;
use crate::rules::{self, GameResult, PlayerAction};
use crate::shoe::{Shoe, ShoeError, ShoeEvent};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Phase {
    Betting,
    PlayerTurns,
    DealerTurn,
    Showdown,
    Settled,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TableError {
    #[error("expected phase {expected:?}, table is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("no seat {0}")]
    NoSuchSeat(usize),
    #[error("bet {got} outside table limits {min}..={max}")]
    BetOutOfRange { min: Money, max: Money, got: Money },
    #[error("no bets placed")]
    NoBets,
    #[error("doubling down is disabled at this table")]
    DoubleDownDisabled,
    #[error("splitting is disabled at this table")]
    SplitDisabled,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shoe(#[from] ShoeError),
    #[error(transparent)]
    Play(#[from] PlayError),
    #[error(transparent)]
    Bet(#[from] BetError),
    #[error(transparent)]
    Bankroll(#[from] BankrollError),
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::WrongPhase { .. } | TableError::NoBets => ErrorKind::InvalidState,
            TableError::NoSuchSeat(_) | TableError::BetOutOfRange { .. } => {
                ErrorKind::InvalidArgument
            }
            TableError::DoubleDownDisabled | TableError::SplitDisabled => ErrorKind::InvalidAction,
            TableError::Config(e) => e.kind(),
            TableError::Shoe(e) => e.kind(),
            TableError::Play(e) => e.kind(),
            TableError::Bet(e) => e.kind(),
            TableError::Bankroll(e) => e.kind(),
        }
    }
}

/// One player and their money.
#[derive(Debug, Clone)]
pub struct Seat {
    player: MultiHandPlayer,
    wallet: Wallet,
}

impl Seat {
    pub fn player(&self) -> &MultiHandPlayer {
        &self.player
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn name(&self) -> &str {
        self.player.name()
    }

    pub fn balance(&self) -> Money {
        self.wallet.balance()
    }

    pub fn has_bet(&self) -> bool {
        !self.player.hands().is_empty()
    }
}

/// The outcome of one settled hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub seat: usize,
    pub hand_index: usize,
    pub player: String,
    pub result: GameResult,
    pub wagered: Money,
    /// Stake plus winnings credited back to the wallet.
    pub returned: Money,
}

impl Settlement {
    /// Returned minus wagered, in cents.
    pub fn net_cents(&self) -> i128 {
        i128::from(self.returned.cents()) - i128::from(self.wagered.cents())
    }
}

#[derive(Debug)]
pub struct Table {
    config: GameConfig,
    shoe: Shoe,
    dealer: Hand,
    seats: Vec<Seat>,
    phase: Phase,
    current_seat: usize,
    round: u64,
    events: Vec<ShoeEvent>,
}

impl Table {
    pub fn new<R>(config: GameConfig, rng: R) -> Result<Self, TableError>
    where
        R: RandomSource + Send + 'static,
    {
        config.validate()?;
        let shoe = Shoe::with_config(&config, rng)?;
        Ok(Self {
            config,
            shoe,
            dealer: Hand::new(),
            seats: Vec::new(),
            phase: Phase::Betting,
            current_seat: 0,
            round: 0,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of rounds dealt so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, index: usize) -> Option<&Seat> {
        self.seats.get(index)
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    pub fn dealer_up_card(&self) -> Option<Card> {
        self.dealer.cards().first().copied()
    }

    /// Seat whose hand is receiving actions, while players are acting.
    pub fn current_seat(&self) -> Option<usize> {
        match self.phase {
            Phase::PlayerTurns => Some(self.current_seat),
            _ => None,
        }
    }

    pub fn current_hand(&self) -> Option<&PlayerHand> {
        let seat = self.current_seat()?;
        self.seats.get(seat)?.player.current_hand()
    }

    /// Shoe notifications collected since the last call, oldest first.
    pub fn take_shoe_events(&mut self) -> Vec<ShoeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_seat(&mut self, name: &str, bankroll: Money) -> Result<usize, TableError> {
        self.expect_phase(Phase::Betting)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BetError::BlankPlayerName.into());
        }
        self.seats.push(Seat {
            player: MultiHandPlayer::new(name, self.config.max_hands_per_player),
            wallet: Wallet::new(bankroll),
        });
        Ok(self.seats.len() - 1)
    }

    pub fn place_bet(&mut self, seat: usize, amount: Money) -> Result<(), TableError> {
        self.expect_phase(Phase::Betting)?;
        let (min, max) = (self.config.min_bet, self.config.max_bet);
        let s = self.seats.get_mut(seat).ok_or(TableError::NoSuchSeat(seat))?;
        if s.has_bet() {
            return Err(PlayError::HandAlreadyStarted.into());
        }
        if amount < min || amount > max {
            return Err(TableError::BetOutOfRange { min, max, got: amount });
        }
        let bet = Bet::new(amount, s.player.name())?;
        s.wallet.withdraw(amount)?;
        s.player.start_hand(PlayerHand::new(Hand::new(), bet))?;
        debug!(seat, player = s.player.name(), %amount, "bet placed");
        Ok(())
    }

    /// Two cards to every seat with a bet and to the dealer, players first.
    pub fn deal(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::Betting)?;
        let bettors: Vec<usize> =
            self.seats.iter().enumerate().filter(|(_, s)| s.has_bet()).map(|(i, _)| i).collect();
        if bettors.is_empty() {
            return Err(TableError::NoBets);
        }
        if self.shoe.remaining_cards() < (bettors.len() + 1) * 2 {
            return Err(ShoeError::Empty.into());
        }
        self.round += 1;
        for _ in 0..2 {
            for &i in &bettors {
                let card = self.shoe.draw()?;
                if let Some(hand) = self.seats[i].player.current_hand_mut() {
                    hand.add_card(card)?;
                }
            }
            let card = self.shoe.draw()?;
            self.dealer.add_card(card);
        }
        debug!(
            round = self.round,
            players = bettors.len(),
            dealer_up = ?self.dealer_up_card(),
            "cards dealt"
        );
        if self.dealer.is_blackjack() {
            debug!(round = self.round, "dealer natural, closing player turns");
            for seat in &mut self.seats {
                for hand in seat.player.hands_mut() {
                    hand.complete();
                }
            }
        }
        self.phase = Phase::PlayerTurns;
        self.current_seat = 0;
        self.progress_turns()?;
        self.collect_shoe_events();
        Ok(())
    }

    /// Actions the current hand may take under this table's rules, the
    /// player's remaining funds and the cards left in the shoe.
    pub fn allowed_actions(&self) -> Vec<PlayerAction> {
        let Some(i) = self.current_seat() else {
            return Vec::new();
        };
        let Some(seat) = self.seats.get(i) else {
            return Vec::new();
        };
        let Some(hand) = seat.player.current_hand() else {
            return Vec::new();
        };
        if !hand.is_active() {
            return Vec::new();
        }
        let remaining = self.shoe.remaining_cards();
        rules::valid_actions(hand.hand())
            .into_iter()
            .filter(|action| remaining >= self.cards_needed(i, *action))
            .filter(|action| match action {
                PlayerAction::Hit => hand.check_can_take_card().is_ok(),
                PlayerAction::Stand => true,
                PlayerAction::DoubleDown => {
                    self.config.allow_double_down && hand.check_double_down(&seat.wallet).is_ok()
                }
                PlayerAction::Split => {
                    self.config.allow_split
                        && seat.player.hands().len() < seat.player.max_hands()
                        && hand.bet().create_split_bet().is_ok()
                        && seat.wallet.can_cover(hand.bet().amount())
                }
            })
            .collect()
    }

    pub fn apply(&mut self, action: PlayerAction) -> Result<(), TableError> {
        match action {
            PlayerAction::Hit => self.hit().map(|_| ()),
            PlayerAction::Stand => self.stand(),
            PlayerAction::DoubleDown => self.double_down().map(|_| ()),
            PlayerAction::Split => self.split(),
        }
    }

    pub fn hit(&mut self) -> Result<Card, TableError> {
        let i = self.acting_seat()?;
        self.acting_hand(i)?.check_can_take_card()?;
        self.ensure_cards(i, PlayerAction::Hit)?;
        let hand = self.seats[i].player.current_hand_mut().ok_or(PlayError::NoCurrentHand)?;
        let card = self.shoe.draw()?;
        hand.add_card(card)?;
        debug!(seat = i, %card, total = hand.hand_value(), "hit");
        self.progress_turns()?;
        self.collect_shoe_events();
        Ok(card)
    }

    pub fn stand(&mut self) -> Result<(), TableError> {
        let i = self.acting_seat()?;
        self.acting_hand(i)?.check_can_stand()?;
        self.ensure_cards(i, PlayerAction::Stand)?;
        let hand = self.seats[i].player.current_hand_mut().ok_or(PlayError::NoCurrentHand)?;
        hand.stand()?;
        debug!(seat = i, total = hand.hand_value(), "stand");
        self.progress_turns()?;
        self.collect_shoe_events();
        Ok(())
    }

    pub fn double_down(&mut self) -> Result<Card, TableError> {
        if !self.config.allow_double_down {
            return Err(TableError::DoubleDownDisabled);
        }
        let i = self.acting_seat()?;
        self.acting_hand(i)?.check_double_down(&self.seats[i].wallet)?;
        self.ensure_cards(i, PlayerAction::DoubleDown)?;
        let seat = &mut self.seats[i];
        let hand = seat.player.current_hand_mut().ok_or(PlayError::NoCurrentHand)?;
        let card = self.shoe.draw()?;
        hand.double_down(card, &mut seat.wallet)?;
        debug!(seat = i, %card, total = hand.hand_value(), stake = %hand.bet().amount(), "double down");
        self.progress_turns()?;
        self.collect_shoe_events();
        Ok(card)
    }

    /// Split the current pair. The first split hand receives its second card
    /// immediately, the other one when its turn comes.
    pub fn split(&mut self) -> Result<(), TableError> {
        if !self.config.allow_split {
            return Err(TableError::SplitDisabled);
        }
        let i = self.acting_seat()?;
        if !rules::can_split(self.acting_hand(i)?.hand()) {
            return Err(PlayError::CannotSplit.into());
        }
        self.ensure_cards(i, PlayerAction::Split)?;
        let seat = &mut self.seats[i];
        seat.player.split_current_hand(&mut seat.wallet)?;
        debug!(seat = i, hands = seat.player.hands().len(), "split");
        self.progress_turns()?;
        self.collect_shoe_events();
        Ok(())
    }

    /// Draw to 17 or more. Skipped when every player hand is already decided.
    /// Fails without drawing if the shoe cannot finish the dealer's hand.
    pub fn play_dealer(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::DealerTurn)?;
        let contested = self
            .seats
            .iter()
            .flat_map(|s| s.player.hands())
            .any(|h| !h.hand().is_busted() && !h.hand().is_blackjack());
        let mut draws = 0;
        if contested && !self.dealer.is_blackjack() {
            let mut preview = self.dealer.clone();
            let mut upcoming = self.shoe.upcoming();
            while rules::should_dealer_hit(preview.value()) {
                preview.add_card(upcoming.next().ok_or(ShoeError::Empty)?);
                draws += 1;
            }
        }
        for _ in 0..draws {
            let card = self.shoe.draw()?;
            self.dealer.add_card(card);
        }
        self.dealer.mark_complete();
        debug!(round = self.round, dealer = %self.dealer, "dealer done");
        self.phase = Phase::Showdown;
        self.collect_shoe_events();
        Ok(())
    }

    /// Resolve every hand against the dealer and credit the wallets.
    pub fn settle(&mut self) -> Result<Vec<Settlement>, TableError> {
        self.expect_phase(Phase::Showdown)?;
        let multiplier = self.config.blackjack_payout;
        let mut out = Vec::new();
        for (si, seat) in self.seats.iter_mut().enumerate() {
            let Seat { player, wallet } = seat;
            let name = player.name().to_string();
            for (hi, hand) in player.hands_mut().iter_mut().enumerate() {
                let result = rules::determine_result(hand.hand(), &self.dealer);
                let wagered = hand.bet().amount();
                let returned = hand.settle(result, multiplier)?;
                wallet.deposit(returned);
                debug!(seat = si, hand = hi, %result, %wagered, %returned, "settled");
                out.push(Settlement {
                    seat: si,
                    hand_index: hi,
                    player: name.clone(),
                    result,
                    wagered,
                    returned,
                });
            }
        }
        self.phase = Phase::Settled;
        Ok(out)
    }

    /// Clear the finished round. A pending reshuffle is carried out here.
    pub fn new_round(&mut self) -> Result<(), TableError> {
        self.expect_phase(Phase::Settled)?;
        for seat in &mut self.seats {
            seat.player.clear();
        }
        self.dealer.clear();
        self.current_seat = 0;
        self.collect_shoe_events();
        if self.shoe.needs_reshuffle_at(self.config.penetration_threshold) {
            info!(
                round = self.round,
                remaining = self.shoe.remaining_cards(),
                "reshuffling between rounds"
            );
            self.shoe.trigger_reshuffle("penetration threshold reached");
            self.collect_shoe_events();
        }
        self.phase = Phase::Betting;
        Ok(())
    }

    /// Reshuffle now regardless of phase, e.g. to recover from an empty shoe.
    pub fn force_reshuffle(&mut self, reason: &str) {
        if !matches!(self.phase, Phase::Betting | Phase::Settled) {
            warn!(phase = ?self.phase, reason, "reshuffling mid-round");
        }
        self.shoe.trigger_reshuffle(reason);
        self.collect_shoe_events();
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), TableError> {
        if self.phase != expected {
            return Err(TableError::WrongPhase { expected, actual: self.phase });
        }
        Ok(())
    }

    fn acting_seat(&self) -> Result<usize, TableError> {
        self.expect_phase(Phase::PlayerTurns)?;
        Ok(self.current_seat)
    }

    fn acting_hand(&self, seat: usize) -> Result<&PlayerHand, TableError> {
        let hand = self.seats.get(seat).and_then(|s| s.player.current_hand());
        Ok(hand.ok_or(PlayError::NoCurrentHand)?)
    }

    // Most cards `action` can pull from the shoe, counting the top-up card
    // every one-card split hand of the seat receives when its turn comes.
    fn cards_needed(&self, seat: usize, action: PlayerAction) -> usize {
        let pending = self.seats.get(seat).map_or(0, |s| {
            s.player.hands().iter().filter(|h| !h.is_complete() && h.hand().len() < 2).count()
        });
        let own = match action {
            PlayerAction::Stand => 0,
            PlayerAction::Hit | PlayerAction::DoubleDown => 1,
            PlayerAction::Split => 2,
        };
        pending + own
    }

    fn ensure_cards(&self, seat: usize, action: PlayerAction) -> Result<(), TableError> {
        if self.shoe.remaining_cards() < self.cards_needed(seat, action) {
            return Err(ShoeError::Empty.into());
        }
        Ok(())
    }

    // Walk the cursor to the next hand needing a decision, topping split hands
    // up to two cards on the way. Moves to the dealer once nobody is left.
    fn progress_turns(&mut self) -> Result<(), TableError> {
        while self.current_seat < self.seats.len() {
            let player = &mut self.seats[self.current_seat].player;
            if player.hands().is_empty() {
                self.current_seat += 1;
                continue;
            }
            if let Some(hand) = player.current_hand_mut() {
                if hand.is_active() {
                    if hand.hand().len() >= 2 {
                        return Ok(());
                    }
                    let card = self.shoe.draw()?;
                    hand.add_card(card)?;
                    continue;
                }
            }
            if player.advance_to_next_hand() {
                continue;
            }
            if !player.all_complete() {
                player.reset_to_first_hand();
                continue;
            }
            self.current_seat += 1;
        }
        self.phase = Phase::DealerTurn;
        Ok(())
    }

    fn collect_shoe_events(&mut self) {
        for event in self.shoe.drain_events() {
            if let ShoeEvent::ReshuffleNeeded(notice) = &event {
                debug!(remaining = notice.remaining_percentage, "shoe below penetration threshold");
            }
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaSource;

    fn table() -> Table {
        Table::new(GameConfig::default(), ChaChaSource::seeded(9)).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let err = Table::new(GameConfig::default().with_deck_count(0), ChaChaSource::seeded(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn bets_are_range_checked_and_withdrawn() {
        let mut t = table();
        let s = t.add_seat("Ann", Money::from_units(100)).unwrap();
        assert!(matches!(
            t.place_bet(s, Money::from_units(5)),
            Err(TableError::BetOutOfRange { .. })
        ));
        assert!(matches!(t.place_bet(7, Money::from_units(10)), Err(TableError::NoSuchSeat(7))));
        t.place_bet(s, Money::from_units(20)).unwrap();
        assert_eq!(t.seats()[s].balance(), Money::from_units(80));
        assert!(t.place_bet(s, Money::from_units(20)).is_err());
        assert_eq!(t.seats()[s].balance(), Money::from_units(80));
    }

    #[test]
    fn deal_requires_bets_and_betting_phase() {
        let mut t = table();
        t.add_seat("Ann", Money::from_units(100)).unwrap();
        assert_eq!(t.deal().unwrap_err(), TableError::NoBets);
        t.place_bet(0, Money::from_units(10)).unwrap();
        t.deal().unwrap();
        assert_eq!(t.dealer_hand().len(), 2);
        assert_eq!(t.round(), 1);
        assert!(matches!(t.deal(), Err(TableError::WrongPhase { .. })));
    }

    #[test]
    fn full_round_pays_out_and_resets() {
        let mut t = table();
        t.add_seat("Ann", Money::from_units(100)).unwrap();
        t.place_bet(0, Money::from_units(10)).unwrap();
        t.deal().unwrap();
        while t.phase() == Phase::PlayerTurns {
            t.stand().unwrap();
        }
        t.play_dealer().unwrap();
        let settlements = t.settle().unwrap();
        assert_eq!(settlements.len(), 1);
        let s = &settlements[0];
        assert_eq!(t.seats()[0].balance(), Money::from_units(90) + s.returned);
        t.new_round().unwrap();
        assert_eq!(t.phase(), Phase::Betting);
        assert!(t.dealer_hand().is_empty());
        assert!(!t.seats()[0].has_bet());
    }

    #[test]
    fn net_is_exact_for_any_amounts() {
        let s = Settlement {
            seat: 0,
            hand_index: 0,
            player: "Ann".to_string(),
            result: GameResult::Lose,
            wagered: Money::from_cents(u64::MAX),
            returned: Money::ZERO,
        };
        assert_eq!(s.net_cents(), -i128::from(u64::MAX));
        let won = Settlement { returned: Money::from_cents(u64::MAX), wagered: Money::ZERO, ..s };
        assert_eq!(won.net_cents(), i128::from(u64::MAX));
    }

    #[test]
    fn disabled_actions_are_rejected() {
        let config = GameConfig::default().with_double_down(false).with_split(false);
        let mut t = Table::new(config, ChaChaSource::seeded(3)).unwrap();
        t.add_seat("Ann", Money::from_units(100)).unwrap();
        t.place_bet(0, Money::from_units(10)).unwrap();
        t.deal().unwrap();
        assert_eq!(t.double_down().unwrap_err(), TableError::DoubleDownDisabled);
        assert_eq!(t.split().unwrap_err(), TableError::SplitDisabled);
        let allowed = t.allowed_actions();
        assert!(!allowed.contains(&PlayerAction::DoubleDown));
        assert!(!allowed.contains(&PlayerAction::Split));
    }
}
