use serde::{Deserialize, Serialize};

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::piece::PieceId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum MoveType {
    Move,
    Capture,
    DoublePush,
    EnPassant,
    Promotion,
    CastleKingSide,
    CastleQueenSide,
}

/// A move as produced by the generator. `target` is the captured piece, which
/// for en passant sits one rank behind `(target_x, target_y)`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Move {
    pub move_type: MoveType,
    pub piece: PieceId,
    pub piece_x: usize,
    pub piece_y: usize,
    pub target: Option<PieceId>,
    pub target_x: usize,
    pub target_y: usize,
}

impl Move {
    pub fn is_castle(&self) -> bool {
        matches!(
            self.move_type,
            MoveType::CastleKingSide | MoveType::CastleQueenSide
        )
    }

    pub fn from(&self) -> (usize, usize) {
        (self.piece_x, self.piece_y)
    }

    pub fn to(&self) -> (usize, usize) {
        (self.target_x, self.target_y)
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q". Promotion is always to a queen.
    pub fn to_uci(&self) -> String {
        let promo = if self.move_type == MoveType::Promotion { "q" } else { "" };
        format!(
            "{}{}{promo}",
            square_name(self.piece_x, self.piece_y),
            square_name(self.target_x, self.target_y)
        )
    }
}

/// Algebraic name of a board coordinate. Row 0 is rank 8.
pub fn square_name(x: usize, y: usize) -> String {
    let file = (b'a' + x as u8) as char;
    let rank = BOARD_HEIGHT - y;
    format!("{file}{rank}")
}

/// Parse an algebraic square such as "e4" into board coordinates.
pub fn parse_square(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')? as usize;
    let rank = bytes[1].checked_sub(b'0')? as usize;
    if file >= BOARD_WIDTH || rank == 0 || rank > BOARD_HEIGHT {
        return None;
    }
    Some((file, BOARD_HEIGHT - rank))
}

/// Parse the squares of a UCI move. A trailing promotion letter is accepted
/// and ignored since promotion always yields a queen.
pub fn parse_uci(s: &str) -> Option<((usize, usize), (usize, usize))> {
    if s.len() < 4 || s.len() > 5 || !s.is_ascii() {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_use_rank_eight_as_row_zero() {
        assert_eq!(square_name(0, 0), "a8");
        assert_eq!(square_name(4, 6), "e2");
        assert_eq!(parse_square("e2"), Some((4, 6)));
        assert_eq!(parse_square("h1"), Some((7, 7)));
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("a9"), None);
        assert_eq!(parse_square("a0"), None);
        assert_eq!(parse_square("e"), None);
    }

    #[test]
    fn uci_text() {
        let m = Move {
            move_type: MoveType::Promotion,
            piece: PieceId(3),
            piece_x: 0,
            piece_y: 1,
            target: None,
            target_x: 0,
            target_y: 0,
        };
        assert_eq!(m.to_uci(), "a7a8q");
        assert_eq!(parse_uci("a7a8q"), Some(((0, 1), (0, 0))));
        assert_eq!(parse_uci("e2e4"), Some(((4, 6), (4, 4))));
        assert_eq!(parse_uci("e2"), None);
        assert_eq!(parse_uci("z2e4"), None);
    }
}
