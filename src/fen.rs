use log::{error, warn};

use crate::board::{Board, EnPassantTarget, BOARD_HEIGHT, BOARD_WIDTH, KINGSIDE, QUEENSIDE};
use crate::error::FenError;
use crate::moves::{parse_square, square_name};
use crate::piece::{Color, PieceType};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    pub fn starting_position() -> Self {
        let mut board = Board::new();
        if let Err(e) = board.load_fen(STARTING_FEN) {
            error!("starting position failed to load: {e}");
        }
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::new();
        board.load_fen(fen)?;
        Ok(board)
    }

    /// Replace the whole position with the one described by `fen`. On error
    /// the board is left in its reset state.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenError> {
        self.reset();
        let result = self.parse_fen(fen);
        if let Err(e) = &result {
            warn!("invalid FEN string '{fen}': {e}");
            self.reset();
        }
        result
    }

    fn parse_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let &[placement, side, castling, en_passant, half_moves, full_moves] = fields.as_slice()
        else {
            return Err(FenError::FieldCount(fields.len()));
        };

        self.parse_placement(placement)?;
        for color in [Color::White, Color::Black] {
            let count = self
                .pieces(color)
                .iter()
                .filter(|&&id| self.piece(id).piece_type == PieceType::King)
                .count();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        match side {
            "w" => self.set_turn(Color::White),
            "b" => self.set_turn(Color::Black),
            _ => return Err(FenError::InvalidSide(side.to_string())),
        }

        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => self.castling_rights.grant(Color::White, KINGSIDE),
                    'Q' => self.castling_rights.grant(Color::White, QUEENSIDE),
                    'k' => self.castling_rights.grant(Color::Black, KINGSIDE),
                    'q' => self.castling_rights.grant(Color::Black, QUEENSIDE),
                    _ => return Err(FenError::InvalidCastling(c)),
                }
            }
        }

        if en_passant != "-" {
            let (x, y) = parse_square(en_passant)
                .ok_or_else(|| FenError::InvalidSquare(en_passant.to_string()))?;
            self.en_passant_target = self.resolve_en_passant(x, y);
            if self.en_passant_target.is_none() {
                warn!("no capturable pawn behind en-passant square {en_passant}, ignoring it");
            }
        }

        self.half_moves = parse_counter("half-move clock", half_moves)?;
        self.full_moves = parse_counter("full-move number", full_moves)?;
        Ok(())
    }

    fn parse_placement(&mut self, placement: &str) -> Result<(), FenError> {
        let (mut x, mut y) = (0i32, 0i32);
        for c in placement.chars() {
            if c == '/' {
                y += 1;
                x = 0;
            } else if let Some(run) = c.to_digit(10) {
                if !(1..=BOARD_WIDTH as u32).contains(&run) {
                    return Err(FenError::InvalidEmptyRun(c));
                }
                x += run as i32;
            } else {
                let (piece_type, color) =
                    PieceType::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                // Rejected placements are logged by the board and skipped.
                let _ = self.place_initial_piece(piece_type, color, x, y);
                x += 1;
            }
        }
        Ok(())
    }

    /// The pawn that just double-pushed past (x, y) belongs to the side not
    /// on move and sits one step further along its own direction.
    fn resolve_en_passant(&self, x: usize, y: usize) -> Option<EnPassantTarget> {
        let mover = self.opponent_turn();
        let pawn_y = y as i32 + mover.pawn_direction();
        if !Board::inside_board(x as i32, pawn_y) {
            return None;
        }
        let pawn = self.get_piece(x, pawn_y as usize)?;
        let p = self.piece(pawn);
        (p.piece_type == PieceType::Pawn && p.color == mover)
            .then_some(EnPassantTarget { x, y, pawn })
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for y in 0..BOARD_HEIGHT {
            let mut empty = 0;
            for x in 0..BOARD_WIDTH {
                match self.piece_at(x, y) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if y < BOARD_HEIGHT - 1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.current_turn() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        let rights = self.castling_rights();
        let mut castling = String::new();
        if rights.kingside(Color::White) {
            castling.push('K');
        }
        if rights.queenside(Color::White) {
            castling.push('Q');
        }
        if rights.kingside(Color::Black) {
            castling.push('k');
        }
        if rights.queenside(Color::Black) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }
        fen.push(' ');
        fen.push_str(&castling);

        fen.push(' ');
        match self.en_passant_target() {
            Some(target) => fen.push_str(&square_name(target.x, target.y)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.half_moves(), self.full_moves()));
        fen
    }
}

fn parse_counter(field: &'static str, value: &str) -> Result<u32, FenError> {
    value.parse::<u32>().map_err(|_| FenError::InvalidCounter {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(board.current_turn(), Color::White);
        assert_eq!(board.pieces(Color::White).len(), 16);
        assert_eq!(board.pieces(Color::Black).len(), 16);

        let white_king = board.king(Color::White).expect("white king");
        assert_eq!((board.piece(white_king).x, board.piece(white_king).y), (4, 7));
        let black_king = board.king(Color::Black).expect("black king");
        assert_eq!((board.piece(black_king).x, board.piece(black_king).y), (4, 0));

        assert_eq!(board.piece_at(0, 0).map(|p| p.fen_char()), Some('r'));
        assert_eq!(board.piece_at(3, 7).map(|p| p.fen_char()), Some('Q'));
        assert!(board.piece_at(4, 4).is_none());
        for color in [Color::White, Color::Black] {
            assert!(board.castling_rights().kingside(color));
            assert!(board.castling_rights().queenside(color));
        }
        assert_eq!(board.en_passant_target(), None);
        assert_eq!(board.full_moves(), 1);
    }

    #[test]
    fn round_trips_reproduce_the_string() {
        let positions = [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 0",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 0",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "8/8/8/2k5/2pP4/8/B7/4K3 b - d3 0 3",
            "r3k2r/8/8/8/8/8/8/4K3 b q - 7 31",
        ];
        for fen in positions {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen);
        }
    }

    #[test]
    fn black_queenside_right_is_serialized_from_its_own_flag() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        assert!(board.castling_rights().queenside(Color::Black));
        assert!(!board.castling_rights().kingside(Color::Black));
        assert!(board.to_fen().contains(" w Kq - "));

        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w k - 0 1").unwrap();
        assert!(board.to_fen().contains(" w k - "));
    }

    #[test]
    fn en_passant_square_resolves_to_pawn_behind_it() {
        let board = Board::from_fen("8/8/8/2k5/2pP4/8/B7/4K3 b - d3 0 3").unwrap();
        let target = board.en_passant_target().expect("target set");
        assert_eq!((target.x, target.y), (3, 5));
        let pawn = board.piece(target.pawn);
        assert_eq!((pawn.x, pawn.y, pawn.color), (3, 4, Color::White));

        let board = Board::from_fen(
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
        )
        .unwrap();
        let target = board.en_passant_target().expect("target set");
        assert_eq!((target.x, target.y), (4, 2));
        assert_eq!(board.piece(target.pawn).color, Color::Black);
    }

    #[test]
    fn en_passant_square_without_pawn_is_dropped() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1").unwrap();
        assert_eq!(board.en_passant_target(), None);
        assert!(board.to_fen().ends_with(" - - 0 1"));
    }

    #[test]
    fn wrong_field_count_resets_board() {
        let mut board = Board::starting_position();
        assert_eq!(
            board.load_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(FenError::FieldCount(4))
        );
        assert!(board.pieces(Color::White).is_empty());
        assert!(board.get_piece(4, 7).is_none());
        assert_eq!(board.current_turn(), Color::White);
        assert_eq!(board.full_moves(), 1);
    }

    #[test]
    fn malformed_fields_are_reported() {
        let mut board = Board::new();
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::InvalidCounter {
                field: "half-move clock",
                value: "x".to_string()
            })
        );
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/4K3 g - - 0 1"),
            Err(FenError::InvalidSide("g".to_string()))
        );
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/4K3 w X - 0 1"),
            Err(FenError::InvalidCastling('X'))
        );
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/4K3 w - z9 0 1"),
            Err(FenError::InvalidSquare("z9".to_string()))
        );
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/4X3 w - - 0 1"),
            Err(FenError::InvalidPiece('X'))
        );
        assert_eq!(
            board.load_fen("4k3/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::KingCount {
                color: Color::White,
                count: 0
            })
        );
        assert!(board.pieces(Color::Black).is_empty(), "failed load leaves reset state");
    }

    #[test]
    fn overlong_rank_skips_pieces_that_fall_off_the_board() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3N w - - 0 1").unwrap();
        assert_eq!(board.pieces(Color::White).len(), 1);
    }
}
