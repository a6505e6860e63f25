use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Board cell index, `rank * 8 + file`, always below 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn file(&self) -> u8 {
        self.0 % 8
    }

    pub fn rank(&self) -> u8 {
        self.0 / 8
    }

    /// Maps a point inside the board (origin top-left, White at the bottom)
    /// to the square under it.
    pub fn from_coords(x: f32, y: f32, square_size: f32) -> Option<Self> {
        if x < 0.0 || y < 0.0 || square_size <= 0.0 {
            return None;
        }
        let file = (x / square_size) as u8;
        let row = (y / square_size) as u8;
        if row > 7 {
            return None;
        }
        Self::new(file, 7 - row) // Flip rank for screen coordinates
    }

    /// Iterates a1, b1, ... h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Square::new(file - b'a', rank - b'1')
                .ok_or_else(|| EngineError::InvalidSquare(s.to_string())),
            _ => Err(EngineError::InvalidSquare(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    fn promotion_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn from_promotion_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn glyph(&self) -> &'static str {
        match (self.kind, self.color) {
            (PieceKind::King, Color::White) => "♔",
            (PieceKind::Queen, Color::White) => "♕",
            (PieceKind::Rook, Color::White) => "♖",
            (PieceKind::Bishop, Color::White) => "♗",
            (PieceKind::Knight, Color::White) => "♘",
            (PieceKind::Pawn, Color::White) => "♙",
            (PieceKind::King, Color::Black) => "♚",
            (PieceKind::Queen, Color::Black) => "♛",
            (PieceKind::Rook, Color::Black) => "♜",
            (PieceKind::Bishop, Color::Black) => "♝",
            (PieceKind::Knight, Color::Black) => "♞",
            (PieceKind::Pawn, Color::Black) => "♟",
        }
    }
}

/// Origin/destination pair, meaningful only relative to a position.
/// Castling is expressed as the king's two-square step (e1g1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.promotion_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    pub fn from_uci(text: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidMove(text.to_string());
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }
        let from = text[0..2].parse::<Square>().map_err(|_| invalid())?;
        let to = text[2..4].parse::<Square>().map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            Some(c) => Some(PieceKind::from_promotion_char(c).ok_or_else(invalid)?),
            None => None,
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.promotion {
            Some(kind) => write!(
                f,
                "{}-{}={}",
                self.from,
                self.to,
                kind.promotion_char().to_ascii_uppercase()
            ),
            None => write!(f, "{}-{}", self.from, self.to),
        }
    }
}
