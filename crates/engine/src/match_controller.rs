use std::collections::HashMap;
use std::fmt;

use tracing::info;

use crate::rules::RulesEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    WhiteWin,
    BlackWin,
    Draw,
    /// The rules engine reported a result string we do not recognise.
    Unknown,
}

impl MatchResult {
    pub fn from_result_string(result: &str) -> Self {
        match result {
            "1-0" => MatchResult::WhiteWin,
            "0-1" => MatchResult::BlackWin,
            "1/2-1/2" => MatchResult::Draw,
            _ => MatchResult::Unknown,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            MatchResult::WhiteWin => "White Won!",
            MatchResult::BlackWin => "Black Won!",
            MatchResult::Draw => "Draw!",
            MatchResult::Unknown => "Game Over!",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Wins per side over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchTally {
    pub white_wins: u32,
    pub black_wins: u32,
}

/// Occurrences of one position that end the game as a draw.
pub const FIVEFOLD_REPETITION: u32 = 5;

#[derive(Debug, Default)]
pub struct MatchController {
    tally: MatchTally,
    game_ended: bool,
    result: Option<MatchResult>,
    repetitions: HashMap<String, u32>,
    fivefold: bool,
}

impl MatchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> MatchTally {
        self.tally
    }

    pub fn game_ended(&self) -> bool {
        self.game_ended
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Counts another occurrence of `position` in the current game and
    /// returns how often it has now been seen.
    pub fn record_position<R: RulesEngine>(&mut self, rules: &R, position: &R::Position) -> u32 {
        let seen = self.repetitions.entry(rules.repetition_key(position)).or_insert(0);
        *seen += 1;
        if *seen >= FIVEFOLD_REPETITION {
            self.fivefold = true;
        }
        *seen
    }

    pub fn is_fivefold_repetition(&self) -> bool {
        self.fivefold
    }

    pub fn is_terminal<R: RulesEngine>(&self, rules: &R, position: &R::Position) -> bool {
        self.fivefold || rules.is_game_over(position)
    }

    /// Result string of the game, including draws by repetition that the
    /// position alone cannot show.
    pub fn result_string<R: RulesEngine>(&self, rules: &R, position: &R::Position) -> String {
        if self.fivefold && !rules.is_game_over(position) {
            return "1/2-1/2".to_string();
        }
        rules.result(position)
    }

    /// Counts a finished game exactly once; repeated calls within the same
    /// game return the first classification without touching the tally.
    pub fn observe_if_terminal<R: RulesEngine>(
        &mut self,
        rules: &R,
        position: &R::Position,
    ) -> Option<MatchResult> {
        if self.game_ended {
            return self.result;
        }
        if !self.is_terminal(rules, position) {
            return None;
        }

        let result = MatchResult::from_result_string(&self.result_string(rules, position));
        match result {
            MatchResult::WhiteWin => self.tally.white_wins += 1,
            MatchResult::BlackWin => self.tally.black_wins += 1,
            MatchResult::Draw | MatchResult::Unknown => {}
        }
        self.game_ended = true;
        self.result = Some(result);
        info!(
            ?result,
            white_wins = self.tally.white_wins,
            black_wins = self.tally.black_wins,
            "game over"
        );
        Some(result)
    }

    /// Fresh starting position for the next game, already counted once for
    /// repetition. The tally is kept.
    pub fn reset<R: RulesEngine>(&mut self, rules: &R) -> R::Position {
        self.game_ended = false;
        self.result = None;
        self.repetitions.clear();
        self.fivefold = false;
        let start = rules.start();
        self.record_position(rules, &start);
        start
    }
}
