//! Error types for the game core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0:?}")]
    InvalidMove(String),

    /// The move is well-formed but not legal in the current position.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("it is not the computer's turn")]
    NotComputerTurn,

    #[error("no engine request is outstanding")]
    NoRequestOutstanding,

    #[error("invalid FEN: {0}")]
    Fen(String),

    #[error("game log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
