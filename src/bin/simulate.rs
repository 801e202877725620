use std::error::Error;
use std::path::PathBuf;
use std::process;

use async_trait::async_trait;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use skipbo::bots::label_for_spec;
use skipbo::{
    Bot, Difficulty, EngineConfig, GameAction, GameState, PacingConfig, Paced, Phase, PlayerId,
    Presentation, Presenter, Preferences, SeatedBots, TurnMachine, describe_action, render_state,
    winner_points,
};

const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Play one Skip-Bo game between two bots.")]
struct Args {
    /// Seed for shuffling and bot randomness
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Bot specs for seat 0 and seat 1: ai, ai:easy|medium|hard, random[:seed]
    #[arg(num_args(2), default_values_t = [String::from("ai"), String::from("ai")])]
    bots: Vec<String>,

    /// Difficulty used by "ai" seats without an explicit level
    #[arg(short, long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Engine configuration JSON (game rules and pacing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stored preferences JSON; its stock size overrides the configuration
    #[arg(short, long)]
    preferences: Option<PathBuf>,

    /// Stop after this many turns without a winner
    #[arg(long, default_value_t = 2000)]
    max_turns: usize,

    /// Wait out the configured presentation times instead of running flat out
    #[arg(long, default_value_t = false)]
    pace: bool,

    /// Print the board at the start of every turn
    #[arg(short, long, default_value_t = false)]
    visualize: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

/// Logs every presentation instead of animating it.
struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn present(&mut self, presentation: &Presentation) {
        match presentation {
            Presentation::Draw { player, motions } => {
                info!(player, cards = motions.len(), "draw");
            }
            Presentation::Play { player, motion } => {
                debug!(player, card = ?motion.card, from = ?motion.from, to = ?motion.to, "play");
            }
            Presentation::Discard { player, motion } => {
                debug!(player, card = ?motion.card, from = ?motion.from, to = ?motion.to, "discard");
            }
            Presentation::Think { .. } => {}
        }
    }
}

/// Logs each decision of the wrapped bots, printing the board when a new turn starts.
struct Narrator<B> {
    inner: B,
    visualize: bool,
    last_seat: Option<PlayerId>,
}

impl<B: Bot> Bot for Narrator<B> {
    fn decide(&mut self, state: &GameState) -> GameAction {
        if self.last_seat != Some(state.current_player) {
            self.last_seat = Some(state.current_player);
            if self.visualize {
                println!("{}", render_state(state));
            }
        }
        let action = self.inner.decide(state);
        info!(player = state.current_player, "{}", describe_action(state, &action));
        action
    }
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
    let engine = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let preferences = match &args.preferences {
        Some(path) => Preferences::load_or_default(path)?,
        None => Preferences::default(),
    };
    let config = engine
        .game
        .with_preferences(&preferences)
        .with_ai_seats([true, true]);
    let pacing = if args.pace {
        engine.pacing
    } else {
        PacingConfig::instant()
    };

    let bots = Narrator {
        inner: SeatedBots::from_specs([args.bots[0].as_str(), args.bots[1].as_str()], args.seed)?,
        visualize: args.visualize,
        last_seat: None,
    };
    let presenter = Paced::new(LogPresenter, pacing);
    let mut machine =
        TurnMachine::new(config, presenter, bots, args.seed)?.with_turn_limit(args.max_turns);
    machine
        .dispatch(GameAction::SetDifficulty {
            difficulty: args.difficulty,
        })
        .await;

    println!(
        "Starting Skip-Bo simulation: {} vs {}.\n",
        label_for_spec(&args.bots[0]),
        label_for_spec(&args.bots[1])
    );
    machine.start().await;

    let state = machine.snapshot();
    let phase = machine.phase();
    let turns = machine.turns();
    if args.visualize {
        println!("{}", render_state(state));
    }

    match (phase, state.winner) {
        (Phase::Finished, Some(winner)) => println!(
            "Game finished after {turns} turns. Winner: Player {winner} ({}), {} points.",
            label_for_spec(&args.bots[winner]),
            winner_points(state).unwrap_or_default()
        ),
        _ => println!("Simulation stopped after {turns} turns without a winner."),
    }
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
