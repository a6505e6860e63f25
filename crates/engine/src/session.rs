//! One table: the position, the click state machine, the running tally and
//! the record of the current game. Hot-seat and computer games share this
//! type and differ only in [`Opponent`].

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::logger::GameLog;
use crate::match_controller::{MatchController, MatchResult};
use crate::rules::{RulesEngine, ShakmatyRules};
use crate::selection::{Outcome, SelectionStateMachine};
use crate::types::{Color, Move, Piece, Square};

/// Who plays the side the local human is not clicking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    /// Local hot-seat: both colors are clicked on the same board.
    Human,
    Computer { color: Color },
}

pub struct MatchSession<R: RulesEngine = ShakmatyRules> {
    rules: R,
    opponent: Opponent,
    position: R::Position,
    selection: SelectionStateMachine,
    controller: MatchController,
    moves: Vec<Move>,
    log: GameLog,
    engine_request_outstanding: bool,
    turn_started: Instant,
}

impl MatchSession<ShakmatyRules> {
    pub fn standard(opponent: Opponent) -> Self {
        Self::new(ShakmatyRules::new(), opponent)
    }
}

impl<R: RulesEngine> MatchSession<R> {
    pub fn new(rules: R, opponent: Opponent) -> Self {
        let mut controller = MatchController::new();
        let position = controller.reset(&rules);
        Self {
            rules,
            opponent,
            position,
            selection: SelectionStateMachine::new(),
            controller,
            moves: Vec::new(),
            log: GameLog::new(),
            engine_request_outstanding: false,
            turn_started: Instant::now(),
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.rules.side_to_move(&self.position)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.rules.piece_at(&self.position, square)
    }

    pub fn selected(&self) -> Option<Square> {
        self.selection.selected()
    }

    /// Moves of the current game in coordinate notation order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut GameLog {
        &mut self.log
    }

    pub fn is_over(&self) -> bool {
        self.controller.game_ended() || self.controller.is_terminal(&self.rules, &self.position)
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.controller.result()
    }

    pub fn match_tally(&self) -> (u32, u32) {
        let tally = self.controller.tally();
        (tally.white_wins, tally.black_wins)
    }

    /// The color whose clicks are currently honoured, if any.
    pub fn human_color_to_move(&self) -> Option<Color> {
        if self.is_over() || self.engine_request_outstanding {
            return None;
        }
        let side = self.side_to_move();
        match self.opponent {
            Opponent::Human => Some(side),
            Opponent::Computer { color } if color == side => None,
            Opponent::Computer { .. } => Some(side),
        }
    }

    pub fn computer_to_move(&self) -> bool {
        match self.opponent {
            Opponent::Computer { color } => !self.is_over() && self.side_to_move() == color,
            Opponent::Human => false,
        }
    }

    pub fn engine_request_outstanding(&self) -> bool {
        self.engine_request_outstanding
    }

    pub fn on_square_clicked(&mut self, square: Square) -> EngineResult<Outcome> {
        let Some(acting) = self.human_color_to_move() else {
            return Ok(Outcome::NoOp);
        };

        let (outcome, next) =
            self.selection
                .handle_click(&self.rules, &self.position, square, acting)?;
        if let (Outcome::MoveApplied(mv), Some(next)) = (outcome, next) {
            self.position = next;
            self.controller.record_position(&self.rules, &self.position);
            self.moves.push(mv);
            let elapsed = self.turn_started.elapsed().as_millis() as u64;
            self.log.log_human_move(mv, elapsed);
            self.turn_started = Instant::now();
            debug!(%mv, ?acting, "human move applied");
            self.observe_if_terminal();
        }
        Ok(outcome)
    }

    /// Legal destinations of the selected piece, for highlighting.
    pub fn current_highlight_set(&self) -> BTreeSet<Square> {
        match self.selection.selected() {
            Some(origin) => {
                SelectionStateMachine::legal_destinations(&self.rules, &self.position, origin)
            }
            None => BTreeSet::new(),
        }
    }

    /// Hands out the position to search and marks the request outstanding.
    /// Returns `None` unless the computer is due to move and nothing is
    /// in flight already.
    pub fn begin_engine_request(&mut self) -> Option<R::Position> {
        if self.engine_request_outstanding || !self.computer_to_move() {
            return None;
        }
        self.engine_request_outstanding = true;
        self.selection.clear();
        Some(self.position.clone())
    }

    pub fn apply_engine_move(&mut self, mv: Move) -> EngineResult<Option<MatchResult>> {
        if !self.engine_request_outstanding {
            return Err(EngineError::NoRequestOutstanding);
        }
        if !self.computer_to_move() {
            return Err(EngineError::NotComputerTurn);
        }

        self.position = self.rules.apply(&self.position, &mv)?;
        self.controller.record_position(&self.rules, &self.position);
        self.engine_request_outstanding = false;
        self.moves.push(mv);
        let elapsed = self.turn_started.elapsed().as_millis() as u64;
        self.log.log_computer_move(mv, elapsed);
        self.turn_started = Instant::now();
        debug!(%mv, "computer move applied");
        Ok(self.observe_if_terminal())
    }

    pub fn observe_if_terminal(&mut self) -> Option<MatchResult> {
        let first_time = !self.controller.game_ended();
        let result = self.controller.observe_if_terminal(&self.rules, &self.position);
        if let (true, Some(result)) = (first_time, result) {
            let pgn_result = self.controller.result_string(&self.rules, &self.position);
            self.log.log_result(result, &pgn_result);
        }
        result
    }

    /// Starts the next game and hands back the record of the one that just
    /// ended. Refused (`None`) while an engine request is in flight, since
    /// that reply belongs to the current game.
    pub fn on_replay_requested(&mut self) -> Option<GameLog> {
        if self.engine_request_outstanding {
            return None;
        }
        if !self.controller.game_ended() && !self.moves.is_empty() {
            self.log.log_game_aborted("replay requested");
        }
        self.position = self.controller.reset(&self.rules);
        self.selection.clear();
        self.moves.clear();
        self.turn_started = Instant::now();
        let (white_wins, black_wins) = self.match_tally();
        info!(white_wins, black_wins, "new game started");
        Some(std::mem::replace(&mut self.log, GameLog::new()))
    }
}
