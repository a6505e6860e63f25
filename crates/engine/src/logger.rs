use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineResult;
use crate::match_controller::MatchResult;
use crate::types::Move;

/// Plain-text record of one game, kept in memory and optionally saved
/// under a timestamped file name.
#[derive(Debug)]
pub struct GameLog {
    pub log_buffer: String,
    move_count: u32,
}

impl GameLog {
    pub fn new() -> Self {
        let mut logger = Self {
            log_buffer: String::with_capacity(4 * 1024),
            move_count: 0,
        };

        logger.log("🎯 === Chess Game Log Started ===");
        logger.log(&format!(
            "📅 Date: {}",
            chrono::Local::now().format("%m/%d/%Y %H:%M:%S")
        ));
        logger
    }

    pub fn log(&mut self, message: &str) {
        self.log_buffer.push_str(message);
        self.log_buffer.push('\n');
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn log_human_move(&mut self, mv: Move, time_ms: u64) {
        self.move_count += 1;
        self.log(&format!(
            "{}. {} (Human move - {}ms)",
            self.move_count, mv, time_ms
        ));
    }

    pub fn log_computer_move(&mut self, mv: Move, time_ms: u64) {
        self.move_count += 1;
        self.log(&format!(
            "{}. {} (Computer move - {}ms)",
            self.move_count, mv, time_ms
        ));
    }

    pub fn log_result(&mut self, result: MatchResult, pgn_result: &str) {
        self.log(&format!("🏁 {} ({})", result, pgn_result));
    }

    pub fn log_game_aborted(&mut self, reason: &str) {
        self.log(&format!("🛑 Game finished abruptly - {}", reason));
    }

    /// Writes the record to `dir/<MM_DD_YYYY_HH_MM_SS>.txt` and returns the path.
    pub fn save_to_file(&mut self, dir: &Path, reason: &str) -> EngineResult<PathBuf> {
        fs::create_dir_all(dir)?;

        let now = chrono::Local::now();
        let filename = dir.join(format!("{}.txt", now.format("%m_%d_%Y_%H_%M_%S")));

        self.log(&format!("💾 Game ended: {} - Saving log", reason));

        let mut file = File::create(&filename)?;
        file.write_all(self.log_buffer.as_bytes())?;
        Ok(filename)
    }
}

impl Default for GameLog {
    fn default() -> Self {
        Self::new()
    }
}
