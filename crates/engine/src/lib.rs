pub mod error;
pub mod logger;
pub mod match_controller;
pub mod rules;
pub mod selection;
pub mod session;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use logger::GameLog;
pub use match_controller::{MatchController, MatchResult, MatchTally};
pub use rules::{RulesEngine, ShakmatyRules};
pub use selection::{Outcome, SelectionState, SelectionStateMachine};
pub use session::{MatchSession, Opponent};
pub use types::*;
