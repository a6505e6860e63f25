//! Errors talking to the search engine. All of them end the match: there is
//! no fallback mover.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("failed to start engine {path:?}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine exited unexpectedly")]
    EngineExited,

    #[error("engine did not answer {expected:?} within {timeout:?}")]
    Unresponsive {
        expected: &'static str,
        timeout: Duration,
    },

    #[error("engine protocol error: {0}")]
    Protocol(String),

    #[error("engine returned no move")]
    NoMove,

    #[error("engine proposed illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("no difficulty tier selected")]
    NoTier,

    #[error("difficulty tier is locked for the current match")]
    TierLocked,

    #[error("the game is already over")]
    GameOver,

    #[error("a move request is already outstanding")]
    RequestOutstanding,

    #[error("search worker stopped")]
    WorkerStopped,
}

pub type SearchResult<T> = Result<T, SearchError>;
