// =============================================================================
// Rules engine
//
// Turns pseudo-legal moves into legal ones and applies moves to the board.
// Legality is tested by applying each candidate in place, asking whether the
// mover's king is attacked, and undoing it again. `TrialMove` owns that
// apply/undo pair so the undo runs on every exit path.
//
// Committing a move (`commit_move`) adds the irreversible bookkeeping on top
// of `perform_move`: en-passant target, castling rights, the castling rook
// jump, the move counters and the turn switch. None of that runs during
// legality testing.
// =============================================================================

use std::ops::Deref;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::board::{Board, EnPassantTarget, BOARD_WIDTH, KINGSIDE, QUEENSIDE};
use crate::movegen::{attacks_square, generate_moves_into};
use crate::moves::{Move, MoveType};
use crate::piece::{Color, PieceType};

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum GameState {
    Nothing,
    Check,
    Stalemate,
    Checkmate,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Stalemate | GameState::Checkmate)
    }
}

#[derive(Clone, Debug)]
pub struct Engine {
    board: Board,
}

/// A move applied for inspection. Dropping it unapplies the move.
pub struct TrialMove<'a> {
    engine: &'a mut Engine,
    mv: Move,
}

impl Deref for TrialMove<'_> {
    type Target = Engine;

    fn deref(&self) -> &Engine {
        &*self.engine
    }
}

impl Drop for TrialMove<'_> {
    fn drop(&mut self) {
        self.engine.unperform_move(&self.mv);
    }
}

impl Engine {
    pub fn new(board: Board) -> Self {
        Engine { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Generator output over every living piece of `color`.
    pub fn pseudo_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for id in self.board.living_pieces(color) {
            generate_moves_into(&self.board, id, &mut moves);
        }
        moves
    }

    /// Whether any living piece of `attacker` attacks (x, y).
    pub fn is_attacked(&self, x: usize, y: usize, attacker: Color) -> bool {
        self.board
            .living_pieces(attacker)
            .any(|id| attacks_square(&self.board, id, x, y))
    }

    pub fn in_check(&self, color: Color) -> bool {
        match self.board.king(color) {
            Some(king) => {
                let k = self.board.piece(king);
                self.is_attacked(k.x, k.y, color.opposite())
            }
            None => false,
        }
    }

    /// Keep the moves that do not leave the mover's king attacked. Castling
    /// is also rejected out of check and across an attacked transit square.
    pub fn legal_moves(&mut self, in_check: bool, pseudo_legal_moves: &[Move]) -> Vec<Move> {
        let mut legal = Vec::with_capacity(pseudo_legal_moves.len());

        for mv in pseudo_legal_moves {
            let color = self.board.piece(mv.piece).color;
            let opponent = color.opposite();
            let Some(king) = self.board.king(color) else {
                legal.push(*mv);
                continue;
            };

            if mv.is_castle() {
                let k = self.board.piece(king);
                let transit_x = match mv.move_type {
                    MoveType::CastleKingSide => k.x + 1,
                    _ => k.x - 1,
                };
                if in_check || self.is_attacked(transit_x, k.y, opponent) {
                    continue;
                }
            }

            let trial = self.trial(*mv);
            let k = trial.board().piece(king);
            if !trial.is_attacked(k.x, k.y, opponent) {
                legal.push(*mv);
            }
        }

        legal
    }

    /// In-check flag and legal moves for the side to move.
    pub fn current_legal_moves(&mut self) -> (bool, Vec<Move>) {
        let color = self.board.current_turn();
        let in_check = self.in_check(color);
        let pseudo_legal = self.pseudo_legal_moves(color);
        let legal = self.legal_moves(in_check, &pseudo_legal);
        (in_check, legal)
    }

    /// Apply `mv` until the returned guard is dropped.
    pub fn trial(&mut self, mv: Move) -> TrialMove<'_> {
        self.perform_move(&mv);
        TrialMove { engine: self, mv }
    }

    /// Reversible part of a move: capture, promotion and relocation.
    pub fn perform_move(&mut self, mv: &Move) {
        if let Some(target) = mv.target {
            let captured = self.board.piece_mut(target);
            captured.alive = false;
            let (x, y) = (captured.x, captured.y);
            self.board.set_piece(x, y, None);
        }

        let piece = self.board.piece_mut(mv.piece);
        if mv.move_type == MoveType::Promotion {
            piece.piece_type = PieceType::Queen;
        }
        piece.x = mv.target_x;
        piece.y = mv.target_y;
        self.board.set_piece(mv.target_x, mv.target_y, Some(mv.piece));
        self.board.set_piece(mv.piece_x, mv.piece_y, None);
    }

    /// Exact inverse of `perform_move`. Must be paired with it.
    pub fn unperform_move(&mut self, mv: &Move) {
        let piece = self.board.piece_mut(mv.piece);
        piece.x = mv.piece_x;
        piece.y = mv.piece_y;
        if mv.move_type == MoveType::Promotion {
            piece.piece_type = PieceType::Pawn;
        }
        self.board.set_piece(mv.target_x, mv.target_y, None);
        self.board.set_piece(mv.piece_x, mv.piece_y, Some(mv.piece));

        if let Some(target) = mv.target {
            let captured = self.board.piece_mut(target);
            captured.alive = true;
            let (x, y) = (captured.x, captured.y);
            self.board.set_piece(x, y, Some(target));
        }
    }

    /// Jump the rook over a king that `perform_move` has already relocated.
    pub fn perform_castle(&mut self, mv: &Move) {
        let (corner_x, direction) = match mv.move_type {
            MoveType::CastleKingSide => (BOARD_WIDTH - 1, -1i32),
            MoveType::CastleQueenSide => (0, 1),
            _ => return,
        };
        let king = *self.board.piece(mv.piece);
        let back_rank = king.color.back_rank();
        let Some(rook) = self.board.get_piece(corner_x, back_rank) else {
            warn!("no rook on the castling corner ({corner_x}, {back_rank})");
            return;
        };

        let rook_x = (king.x as i32 + direction) as usize;
        let (old_x, old_y) = {
            let r = self.board.piece(rook);
            (r.x, r.y)
        };
        self.board.set_piece(old_x, old_y, None);
        self.board.set_piece(rook_x, king.y, Some(rook));
        let r = self.board.piece_mut(rook);
        r.x = rook_x;
        r.y = king.y;
    }

    /// Record the skipped square after a double push, clear it otherwise.
    pub fn set_en_passant_target(&mut self, mv: &Move) {
        self.board.en_passant_target = if mv.move_type == MoveType::DoublePush {
            let dir = self.board.piece(mv.piece).color.pawn_direction();
            Some(EnPassantTarget {
                x: mv.target_x,
                y: (mv.target_y as i32 - dir) as usize,
                pawn: mv.piece,
            })
        } else {
            None
        };
    }

    /// Clear rights lost by this move. Corners are attributed by position,
    /// not by tracking which rook stood there.
    pub fn update_castling_rights(&mut self, mv: &Move) {
        let piece = *self.board.piece(mv.piece);
        let rights = &mut self.board.castling_rights;

        if piece.piece_type == PieceType::King || mv.is_castle() {
            rights.clear_all(piece.color);
        }
        if mv.target.is_some() {
            if let Some((color, side)) = rook_corner(mv.target_x, mv.target_y) {
                rights.clear(color, side);
            }
        }
        if piece.piece_type == PieceType::Rook {
            if let Some((color, side)) = rook_corner(mv.piece_x, mv.piece_y) {
                rights.clear(color, side);
            }
        }
    }

    /// The fifty-move rule wins over everything, then mate and stalemate.
    pub fn is_gameover(&self, in_check: bool, legal_move_count: usize) -> GameState {
        if self.board.fifty_move_rule_reached() {
            info!("stalemate by the fifty-move rule");
            return GameState::Stalemate;
        }
        if legal_move_count == 0 {
            if in_check {
                info!("checkmate, {} wins", self.board.opponent_turn().name());
                return GameState::Checkmate;
            }
            info!("stalemate");
            return GameState::Stalemate;
        }
        if in_check {
            debug!("{} is in check", self.board.current_turn().name());
            return GameState::Check;
        }
        GameState::Nothing
    }

    /// Permanently play `mv`, which must be legal for the side to move.
    pub fn commit_move(&mut self, mv: &Move) {
        debug!("commit {}", mv.to_uci());
        self.perform_move(mv);
        self.set_en_passant_target(mv);
        self.update_castling_rights(mv);
        self.perform_castle(mv);
        self.board.update_full_moves();
        self.board.update_half_moves(mv);
        self.board.switch_turn();
    }

    /// Number of leaf positions `depth` plies ahead.
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut engine = self.clone();
        let (_, legal) = engine.current_legal_moves();
        if depth == 1 {
            return legal.len() as u64;
        }
        legal
            .iter()
            .map(|mv| {
                let mut child = engine.clone();
                child.commit_move(mv);
                child.perft(depth - 1)
            })
            .sum()
    }
}

/// Owner and side of a rook starting corner.
fn rook_corner(x: usize, y: usize) -> Option<(Color, usize)> {
    let color = [Color::White, Color::Black]
        .into_iter()
        .find(|c| c.back_rank() == y)?;
    match x {
        0 => Some((color, QUEENSIDE)),
        x if x == BOARD_WIDTH - 1 => Some((color, KINGSIDE)),
        _ => None,
    }
}
