mod app;
mod config;

use std::sync::{Arc, Mutex};

use ai::{DifficultyCoordinator, SearchWorker, UciProcess, DEFAULT_RESPONSE_TIMEOUT};
use anyhow::{anyhow, bail, Context};
use app::ChessApp;
use clap::Parser;
use config::Args;
use engine::{Opponent, ShakmatyRules};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();
    let opponent = args.opponent();

    let worker = match opponent {
        Opponent::Computer { color } => {
            let process = UciProcess::spawn(&args.engine, DEFAULT_RESPONSE_TIMEOUT)
                .with_context(|| format!("starting chess engine {}", args.engine))?;
            info!(engine = process.name().unwrap_or("unknown"), ?color, "engine ready");
            let coordinator = DifficultyCoordinator::with_move_time(process, args.move_time());
            Some(SearchWorker::spawn(ShakmatyRules::new(), coordinator)?)
        }
        Opponent::Human => None,
    };

    let fatal = Arc::new(Mutex::new(None));
    let app = ChessApp::new(opponent, worker, args.tier(), args.log_dir(), Arc::clone(&fatal));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 860.0])
            .with_title("Chess"),
        ..Default::default()
    };

    eframe::run_native("Chess", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow!("window failed: {e}"))?;

    let message = fatal.lock().ok().and_then(|mut slot| slot.take());
    if let Some(message) = message {
        bail!(message);
    }
    Ok(())
}
