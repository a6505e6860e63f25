use std::path::PathBuf;
use std::time::Duration;

use ai::DifficultyTier;
use clap::{Parser, ValueEnum};
use engine::{Color, Opponent};

#[derive(Parser, Debug)]
#[command(name = "chess", about = "Play chess against a friend or a UCI engine")]
pub struct Args {
    /// Path to the UCI engine binary.
    #[arg(long, env = "CHESS_ENGINE", default_value = "stockfish")]
    pub engine: String,

    /// Who plays the other side.
    #[arg(long, value_enum, default_value_t = OpponentArg::Computer)]
    pub opponent: OpponentArg,

    /// Color played by the computer.
    #[arg(long, value_enum, default_value_t = SideArg::Black)]
    pub computer_color: SideArg,

    /// Skip the difficulty menu and use this tier for every game.
    #[arg(long, value_enum)]
    pub difficulty: Option<TierArg>,

    /// Wall-clock ceiling per computer move in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub move_time_ms: u64,

    /// Save a record of every finished game.
    #[arg(long)]
    pub save_logs: bool,

    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

impl Args {
    pub fn opponent(&self) -> Opponent {
        match self.opponent {
            OpponentArg::Human => Opponent::Human,
            OpponentArg::Computer => Opponent::Computer {
                color: self.computer_color.into(),
            },
        }
    }

    pub fn tier(&self) -> Option<DifficultyTier> {
        self.difficulty.map(Into::into)
    }

    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.save_logs.then(|| self.log_dir.clone())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentArg {
    Human,
    Computer,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideArg {
    White,
    Black,
}

impl From<SideArg> for Color {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::White => Color::White,
            SideArg::Black => Color::Black,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierArg {
    Easy,
    Normal,
    Hard,
}

impl From<TierArg> for DifficultyTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Easy => DifficultyTier::Easy,
            TierArg::Normal => DifficultyTier::Normal,
            TierArg::Hard => DifficultyTier::Hard,
        }
    }
}
