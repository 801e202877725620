use std::collections::HashMap;
use std::error::Error;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use skipbo::bots::{create_bot_from_spec, label_for_spec};
use skipbo::{Bot, GameAction, GameConfig, GameState, Immediate, Phase, SeatedBots, TurnMachine};
use skipbo::winner_points;

/// Default base seed for deterministic runs.
const DEFAULT_SEED: u64 = 0xC0FFEE_u64 << 32 | 0x5EED_u64;

#[derive(Parser, Debug)]
#[command(
    name = "winrate",
    about = "Run many games between two bots and report per-bot win rates."
)]
struct Args {
    /// Number of games to simulate
    #[arg(short = 'g', long = "games", default_value_t = 200)]
    games: usize,

    /// Base RNG seed (deck + bot RNGs will be derived deterministically)
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Safety cap on turns per game; games exceeding this count as stalled
    #[arg(long = "max-turns", default_value_t = 2000)]
    max_turns: usize,

    /// Optional override for per-player stock size, to shorten games for quick benchmarking
    #[arg(long = "stock-size")]
    stock_size: Option<usize>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: LevelFilter,

    /// Bot specs for the two seats, e.g. ai:hard ai:easy
    #[arg(num_args(2))]
    bots: Vec<String>,
}

/// Decision time and count, shared between a bot and the report.
#[derive(Default)]
struct Timing {
    total: Duration,
    decisions: usize,
}

/// Measures how long the wrapped bot takes per decision.
struct TimedBot {
    inner: Box<dyn Bot>,
    timing: Arc<Mutex<Timing>>,
}

impl Bot for TimedBot {
    fn decide(&mut self, state: &GameState) -> GameAction {
        let started = Instant::now();
        let action = self.inner.decide(state);
        if let Ok(mut timing) = self.timing.lock() {
            timing.total += started.elapsed();
            timing.decisions += 1;
        }
        action
    }
}

#[derive(Default)]
struct Tally {
    wins: usize,
    seats: usize,
    points: u64,
    timing: Arc<Mutex<Timing>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    initialize_logging(args.log_level);
    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.bots.len() != 2 {
        return Err(format!("expected two bot specs, received {}", args.bots.len()).into());
    }
    let mut config = GameConfig::default().with_ai_seats([true, true]);
    if let Some(stock) = args.stock_size {
        config = config.with_stock_size(stock);
    }
    config.validate()?;

    let labels: Vec<String> = args.bots.iter().map(|spec| label_for_spec(spec)).collect();
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for label in &labels {
        tallies.entry(label.clone()).or_default();
    }
    let mut stalled_games = 0usize;

    for game_idx in 0..args.games {
        // Permute seating each game for fairness.
        let mut order = [0usize, 1];
        let mut seat_rng = StdRng::seed_from_u64(args.seed ^ 0x9E37_79B9 ^ (game_idx as u64));
        order.shuffle(&mut seat_rng);

        let mut seats: Vec<Box<dyn Bot>> = Vec::with_capacity(2);
        for (seat, spec_idx) in order.iter().enumerate() {
            let label = &labels[*spec_idx];
            let tally = tallies.entry(label.clone()).or_default();
            tally.seats += 1;
            let bot_seed = mix_seed(args.seed, game_idx as u64, seat as u64);
            seats.push(Box::new(TimedBot {
                inner: create_bot_from_spec(&args.bots[*spec_idx], seat, bot_seed)?,
                timing: Arc::clone(&tally.timing),
            }));
        }
        let [first, second]: [Box<dyn Bot>; 2] = seats
            .try_into()
            .map_err(|_| "expected exactly two seats")?;

        let deck_seed = mix_seed(args.seed, game_idx as u64, 0x5EED_15);
        let mut machine = TurnMachine::new(
            config,
            Immediate,
            SeatedBots::new([first, second]),
            deck_seed,
        )?
        .with_turn_limit(args.max_turns);
        machine.start().await;

        let state = machine.snapshot();
        match (machine.phase(), state.winner) {
            (Phase::Finished, Some(winner)) => {
                let label = &labels[order[winner]];
                if let Some(tally) = tallies.get_mut(label) {
                    tally.wins += 1;
                    tally.points += winner_points(state).unwrap_or_default() as u64;
                }
            }
            _ => stalled_games += 1,
        }
    }

    let mut results: Vec<(&String, &Tally)> = tallies.iter().collect();
    results.sort_by(|a, b| {
        let rate = |tally: &Tally| tally.wins as f64 / tally.seats.max(1) as f64;
        rate(b.1)
            .partial_cmp(&rate(a.1))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    println!("Win rates (per-seat) with scoring:");
    for (label, tally) in &results {
        let seats = tally.seats.max(1) as f64;
        println!(
            "  {label:<12}  {}/{}  ({:.2}%)   avg pts: {:>6.2}   total pts: {}",
            tally.wins,
            tally.seats,
            tally.wins as f64 / seats * 100.0,
            tally.points as f64 / seats,
            tally.points
        );
    }
    if stalled_games > 0 {
        println!("\nNote: {stalled_games} game(s) hit the turn limit without a winner.");
    }

    println!("\nDecision time (per bot label):");
    for (label, tally) in &results {
        let Ok(timing) = tally.timing.lock() else {
            continue;
        };
        let total_ms = timing.total.as_secs_f64() * 1.0e3;
        let avg_ms = total_ms / timing.decisions.max(1) as f64;
        println!(
            "  {label:<12}  decisions: {:<7}  total: {total_ms:.3} ms  avg: {avg_ms:.3} ms",
            timing.decisions
        );
    }

    Ok(())
}

fn mix_seed(base: u64, a: u64, b: u64) -> u64 {
    let mut z =
        base ^ (a.wrapping_mul(0x9E37_79B97F4A7C15)) ^ (b.wrapping_mul(0xBF58_476D1CE4E5B9));
    z ^= z >> 12;
    z ^= z << 25;
    z ^= z >> 27;
    z
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(Targets::new().with_default(level))
        .init();
}
