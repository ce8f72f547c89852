use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Index into per-colour tables: White = 0, Black = 1.
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Rank step for this colour's pawns. White moves toward row 0.
    pub fn pawn_direction(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row holding this colour's king and rooks at the start of a game.
    pub fn back_rank(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Lowercase FEN letter for this piece type.
    pub fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// Parse a FEN letter. Case decides the colour: uppercase is White.
    pub fn from_fen_char(c: char) -> Option<(PieceType, Color)> {
        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some((piece_type, color))
    }
}

/// Stable handle into a board's piece arena. Handles stay valid for the
/// lifetime of a position; they are invalidated only by a FEN reload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct PieceId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color, x: usize, y: usize) -> Self {
        Piece {
            piece_type,
            color,
            x,
            y,
            alive: true,
        }
    }

    /// FEN letter, uppercased for White.
    pub fn fen_char(&self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_letters_carry_colour() {
        assert_eq!(PieceType::from_fen_char('K'), Some((PieceType::King, Color::White)));
        assert_eq!(PieceType::from_fen_char('n'), Some((PieceType::Knight, Color::Black)));
        assert_eq!(PieceType::from_fen_char('x'), None);
        assert_eq!(PieceType::from_fen_char('3'), None);

        let queen = Piece::new(PieceType::Queen, Color::White, 3, 7);
        assert_eq!(queen.fen_char(), 'Q');
        let pawn = Piece::new(PieceType::Pawn, Color::Black, 0, 1);
        assert_eq!(pawn.fen_char(), 'p');
    }

    #[test]
    fn pawn_direction_depends_on_colour_only() {
        assert_eq!(Color::White.pawn_direction(), -1);
        assert_eq!(Color::Black.pawn_direction(), 1);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::White.back_rank(), 7);
        assert_eq!(Color::Black.back_rank(), 0);
    }
}
