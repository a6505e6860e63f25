use std::time::{Duration, Instant};

use ai::{DifficultyCoordinator, DifficultyTier, UciProcess, DEFAULT_RESPONSE_TIMEOUT};
use anyhow::Context;
use clap::Parser;
use engine::ShakmatyRules;
use tracing_subscriber::EnvFilter;

/// Asks a UCI engine for a move at every difficulty tier.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the UCI engine binary.
    #[arg(long, env = "CHESS_ENGINE", default_value = "stockfish")]
    engine: String,

    /// Wall-clock ceiling per move in milliseconds.
    #[arg(long, default_value_t = 100)]
    move_time_ms: u64,
}

const POSITIONS: [(&str, &str); 2] = [
    (
        "Initial position",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "Tactical position",
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 4 4",
    ),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    println!("🤖 Probing engine {}", args.engine);
    println!("{}", "=".repeat(50));

    let process = UciProcess::spawn(&args.engine, DEFAULT_RESPONSE_TIMEOUT)
        .with_context(|| format!("starting {}", args.engine))?;
    println!("Engine: {}", process.name().unwrap_or("unknown"));

    let rules = ShakmatyRules::new();
    let mut coordinator =
        DifficultyCoordinator::with_move_time(process, Duration::from_millis(args.move_time_ms));

    for tier in DifficultyTier::ALL {
        coordinator.new_game()?;
        coordinator.select_tier(tier)?;
        println!("\n🎯 {tier}");
        for (label, fen) in POSITIONS {
            let position = rules.from_fen(fen)?;
            let started = Instant::now();
            let mv = coordinator.request_move(&rules, &position)?;
            println!(
                "✅ {label}: {mv} ({}ms)",
                started.elapsed().as_millis()
            );
        }
    }

    Ok(())
}
