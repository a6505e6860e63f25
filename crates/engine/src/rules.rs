//! The chess rules capability consumed by the game core.
//!
//! Everything the core knows about a position goes through [`RulesEngine`];
//! [`ShakmatyRules`] backs it with the `shakmaty` move generator.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Position as _, Rank, Role};

use crate::error::{EngineError, EngineResult};
use crate::types::{Color, Move, Piece, PieceKind, Square};

/// Halfmove clock value at which the 75-move rule ends the game.
const SEVENTY_FIVE_MOVE_RULE: u32 = 150;

pub trait RulesEngine {
    type Position: Clone;

    /// Standard starting position.
    fn start(&self) -> Self::Position;

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move>;

    /// Returns the position after `mv`, leaving `position` untouched.
    fn apply(&self, position: &Self::Position, mv: &Move) -> EngineResult<Self::Position>;

    fn is_legal(&self, position: &Self::Position, mv: &Move) -> bool {
        self.legal_moves(position).contains(mv)
    }

    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<Piece>;

    fn side_to_move(&self, position: &Self::Position) -> Color;

    fn is_game_over(&self, position: &Self::Position) -> bool;

    /// `"1-0"`, `"0-1"`, `"1/2-1/2"`, or `"*"` while the game is running.
    fn result(&self, position: &Self::Position) -> String;

    fn fen(&self, position: &Self::Position) -> String;

    /// Identifies a position for repetition counting: placement, side to
    /// move, castling rights and en passant square, without the clocks.
    fn repetition_key(&self, position: &Self::Position) -> String {
        self.fen(position)
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Finds the legal move going from `from` to `to`. When several
    /// promotions share the pair, the queen promotion wins.
    fn find_move(&self, position: &Self::Position, from: Square, to: Square) -> Option<Move> {
        let mut candidates = self
            .legal_moves(position)
            .into_iter()
            .filter(|mv| mv.from == from && mv.to == to);
        let first = candidates.next()?;
        if first.promotion.is_none() || first.promotion == Some(PieceKind::Queen) {
            return Some(first);
        }
        Some(
            candidates
                .find(|mv| mv.promotion == Some(PieceKind::Queen))
                .unwrap_or(first),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    pub fn new() -> Self {
        Self
    }

    pub fn from_fen(&self, fen: &str) -> EngineResult<Chess> {
        let fen: Fen = fen
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| EngineError::Fen(e.to_string()))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::Fen(e.to_string()))
    }

    fn find_native(&self, position: &Chess, mv: &Move) -> Option<shakmaty::Move> {
        position
            .legal_moves()
            .iter()
            .find(|native| from_native(native).as_ref() == Some(mv))
            .cloned()
    }
}

impl RulesEngine for ShakmatyRules {
    type Position = Chess;

    fn start(&self) -> Chess {
        Chess::default()
    }

    fn legal_moves(&self, position: &Chess) -> Vec<Move> {
        position.legal_moves().iter().filter_map(from_native).collect()
    }

    fn apply(&self, position: &Chess, mv: &Move) -> EngineResult<Chess> {
        let native = self
            .find_native(position, mv)
            .ok_or_else(|| EngineError::IllegalMove {
                mv: mv.to_uci(),
                fen: self.fen(position),
            })?;
        let mut next = position.clone();
        next.play_unchecked(&native);
        Ok(next)
    }

    fn is_legal(&self, position: &Chess, mv: &Move) -> bool {
        self.find_native(position, mv).is_some()
    }

    fn piece_at(&self, position: &Chess, square: Square) -> Option<Piece> {
        position
            .board()
            .piece_at(to_native_square(square))
            .map(|piece| Piece {
                kind: from_role(piece.role),
                color: from_native_color(piece.color),
            })
    }

    fn side_to_move(&self, position: &Chess) -> Color {
        from_native_color(position.turn())
    }

    fn is_game_over(&self, position: &Chess) -> bool {
        position.is_game_over() || position.halfmoves() >= SEVENTY_FIVE_MOVE_RULE
    }

    fn result(&self, position: &Chess) -> String {
        match position.outcome() {
            Some(outcome) => outcome.to_string(),
            None if position.halfmoves() >= SEVENTY_FIVE_MOVE_RULE => "1/2-1/2".to_string(),
            None => "*".to_string(),
        }
    }

    fn fen(&self, position: &Chess) -> String {
        Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
    }
}

fn to_native_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(
        File::new(u32::from(square.file())),
        Rank::new(u32::from(square.rank())),
    )
}

fn from_native_square(square: shakmaty::Square) -> Option<Square> {
    Square::from_index(square as u8)
}

fn from_native_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn from_native(native: &shakmaty::Move) -> Option<Move> {
    let from = native.from()?;
    let to = match *native {
        // shakmaty encodes castling as king-takes-rook
        shakmaty::Move::Castle { king, rook } => {
            let file = if rook.file() as u32 > king.file() as u32 {
                File::G
            } else {
                File::C
            };
            shakmaty::Square::from_coords(file, king.rank())
        }
        _ => native.to(),
    };
    Some(Move {
        from: from_native_square(from)?,
        to: from_native_square(to)?,
        promotion: native.promotion().map(from_role),
    })
}
