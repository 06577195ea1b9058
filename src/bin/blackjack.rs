use blackjack_rs::agents::{AgentTable, BasicStrategyAgent, DealerMimicAgent};
use blackjack_rs::config::GameConfig;
use blackjack_rs::money::Money;
use blackjack_rs::rng::ChaChaSource;
use blackjack_rs::rules::GameResult;
use blackjack_rs::table::{Table, TableError};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Headless blackjack simulation: automated players against the dealer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Rounds to play
    #[arg(short, long, default_value_t = 100)]
    rounds: u64,

    /// Shoe seed; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = 6)]
    decks: usize,

    /// Seats at the table; even seats play basic strategy, odd seats mimic the dealer
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Flat bet per round
    #[arg(short, long, default_value = "10")]
    bet: Money,

    /// Starting bankroll per seat
    #[arg(long, default_value = "1000")]
    bankroll: Money,

    /// Reshuffle once the remaining fraction of the shoe drops below this
    #[arg(long, default_value_t = 0.25)]
    penetration: f64,

    #[arg(long, default_value_t = 1.5)]
    blackjack_payout: f64,
}

#[derive(Debug, Default)]
struct Tally {
    wins: u64,
    losses: u64,
    pushes: u64,
    blackjacks: u64,
}

fn main() -> Result<(), TableError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig::default()
        .with_deck_count(args.decks)
        .with_penetration_threshold(args.penetration)
        .with_blackjack_payout(args.blackjack_payout);
    let rng = match args.seed {
        Some(seed) => ChaChaSource::seeded(seed),
        None => ChaChaSource::from_entropy(),
    };
    let mut table = Table::new(config, rng)?;
    let mut agents = AgentTable::for_seats(args.players);
    for seat in 0..args.players {
        let name = format!("P{}", seat + 1);
        table.add_seat(&name, args.bankroll)?;
        if seat % 2 == 0 {
            agents.set_agent(seat, Box::new(BasicStrategyAgent));
        } else {
            agents.set_agent(seat, Box::new(DealerMimicAgent));
        }
    }
    info!(rounds = args.rounds, players = args.players, decks = args.decks, "starting simulation");

    // enough cards for a long round at a full table
    let reserve = (args.players + 1) * 10;
    let mut tally = Tally::default();
    for _ in 0..args.rounds {
        if table.shoe().remaining_cards() < reserve {
            table.force_reshuffle("shoe too short for another round");
        }
        let mut any_bet = false;
        for seat in 0..args.players {
            if table.seats()[seat].balance() < args.bet {
                continue;
            }
            match table.place_bet(seat, args.bet) {
                Ok(()) => any_bet = true,
                Err(e) => warn!(seat, error = %e, "bet refused"),
            }
        }
        if !any_bet {
            info!(round = table.round(), "every player is out of money");
            break;
        }
        table.deal()?;
        agents.drive(&mut table)?;
        table.play_dealer()?;
        for s in table.settle()? {
            match s.result {
                GameResult::Win => tally.wins += 1,
                GameResult::Lose => tally.losses += 1,
                GameResult::Push => tally.pushes += 1,
                GameResult::Blackjack => tally.blackjacks += 1,
                _ => {}
            }
        }
        table.new_round()?;
    }

    println!("rounds played: {}", table.round());
    println!(
        "hands: {} won, {} lost, {} pushed, {} blackjacks",
        tally.wins, tally.losses, tally.pushes, tally.blackjacks
    );
    for seat in table.seats() {
        println!("{:>4}: {}", seat.name(), seat.balance());
    }
    Ok(())
}
