use std::fmt;
use std::time::Duration;

/// Wall-clock ceiling per computer move unless configured otherwise.
pub const DEFAULT_MOVE_TIME: Duration = Duration::from_millis(100);

/// Computer strength, fixed for the length of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Normal,
        DifficultyTier::Hard,
    ];

    /// Value for the engine's `Skill Level` option.
    pub fn skill_level(self) -> u8 {
        match self {
            DifficultyTier::Easy => 1,
            DifficultyTier::Normal => 5,
            DifficultyTier::Hard => 10,
        }
    }

    /// Depth ceiling in plies.
    pub fn depth(self) -> u32 {
        match self {
            DifficultyTier::Easy => 3,
            DifficultyTier::Normal => 5,
            DifficultyTier::Hard => 7,
        }
    }

    /// Rough playing strength, for menus.
    pub fn approx_elo(self) -> u32 {
        match self {
            DifficultyTier::Easy => 500,
            DifficultyTier::Normal => 1000,
            DifficultyTier::Hard => 1500,
        }
    }

    pub fn limits(self, move_time: Duration) -> SearchLimits {
        SearchLimits {
            depth: self.depth(),
            move_time,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Normal => "Normal",
            DifficultyTier::Hard => "Hard",
        };
        write!(f, "{} (~{})", name, self.approx_elo())
    }
}

/// Search bounds; whichever binds first ends the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: u32,
    pub move_time: Duration,
}
