//! Click-driven piece selection.
//!
//! One click picks an origin, the next either plays a legal move, jumps the
//! selection to another own piece, or cancels. There is no explicit deselect
//! gesture.

use std::collections::BTreeSet;

use crate::error::EngineResult;
use crate::rules::RulesEngine;
use crate::types::{Color, Move, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected(Square),
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoOp,
    Reselected(Square),
    MoveApplied(Move),
    InvalidIgnored,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<Square> {
        match self.state {
            SelectionState::Selected(origin) => Some(origin),
            SelectionState::NoSelection => None,
        }
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::NoSelection;
    }

    pub fn legal_destinations<R: RulesEngine>(
        rules: &R,
        position: &R::Position,
        origin: Square,
    ) -> BTreeSet<Square> {
        rules
            .legal_moves(position)
            .into_iter()
            .filter(|mv| mv.from == origin)
            .map(|mv| mv.to)
            .collect()
    }

    /// Feeds one click for the `acting` side. On `MoveApplied` the returned
    /// position replaces the caller's; otherwise it is `None`.
    pub fn handle_click<R: RulesEngine>(
        &mut self,
        rules: &R,
        position: &R::Position,
        square: Square,
        acting: Color,
    ) -> EngineResult<(Outcome, Option<R::Position>)> {
        let own_piece = rules
            .piece_at(position, square)
            .is_some_and(|piece| piece.color == acting);

        match self.state {
            SelectionState::NoSelection if own_piece => {
                self.state = SelectionState::Selected(square);
                Ok((Outcome::Reselected(square), None))
            }
            SelectionState::NoSelection => Ok((Outcome::NoOp, None)),
            SelectionState::Selected(origin) => {
                if let Some(mv) = rules.find_move(position, origin, square) {
                    let next = rules.apply(position, &mv)?;
                    self.state = SelectionState::NoSelection;
                    Ok((Outcome::MoveApplied(mv), Some(next)))
                } else if own_piece {
                    self.state = SelectionState::Selected(square);
                    Ok((Outcome::Reselected(square), None))
                } else {
                    self.state = SelectionState::NoSelection;
                    Ok((Outcome::InvalidIgnored, None))
                }
            }
        }
    }
}
