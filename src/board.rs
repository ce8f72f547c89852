use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::moves::{Move, MoveType};
use crate::piece::{Color, Piece, PieceId, PieceType};

pub const BOARD_WIDTH: usize = 8;
pub const BOARD_HEIGHT: usize = 8;

pub const KINGSIDE: usize = 0;
pub const QUEENSIDE: usize = 1;

pub type Grid = [[Option<PieceId>; BOARD_WIDTH]; BOARD_HEIGHT];

/// How the half-move clock advances on quiet moves.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub enum HalfmoveCounting {
    /// Increments once per full move, after Black has moved.
    #[default]
    PerFullMove,
    /// Increments on every ply, as in standard FEN.
    PerPly,
}

/// Rule parameters that survive FEN reloads.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct RulesConfig {
    pub halfmove_counting: HalfmoveCounting,
    /// The game is drawn once the half-move clock reaches this value.
    pub fifty_move_limit: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            halfmove_counting: HalfmoveCounting::PerFullMove,
            fifty_move_limit: 50,
        }
    }
}

impl RulesConfig {
    /// Per-ply clock with the matching 100-ply limit.
    pub fn standard() -> Self {
        RulesConfig {
            halfmove_counting: HalfmoveCounting::PerPly,
            fifty_move_limit: 100,
        }
    }
}

/// Castling availability indexed by colour, then by `KINGSIDE` / `QUEENSIDE`.
/// Rights are only ever cleared during play; granting happens on FEN load.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct CastlingRights {
    rights: [[bool; 2]; 2],
}

impl CastlingRights {
    pub fn get(&self, color: Color, side: usize) -> bool {
        self.rights[color.index()][side]
    }

    pub fn kingside(&self, color: Color) -> bool {
        self.get(color, KINGSIDE)
    }

    pub fn queenside(&self, color: Color) -> bool {
        self.get(color, QUEENSIDE)
    }

    pub fn clear(&mut self, color: Color, side: usize) {
        self.rights[color.index()][side] = false;
    }

    pub fn clear_all(&mut self, color: Color) {
        self.rights[color.index()] = [false, false];
    }

    pub(crate) fn grant(&mut self, color: Color, side: usize) {
        self.rights[color.index()][side] = true;
    }
}

/// The square a pawn skipped over on its double push, plus that pawn.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct EnPassantTarget {
    pub x: usize,
    pub y: usize,
    pub pawn: PieceId,
}

/// Position state. Pieces live in an arena; the grid and the per-colour
/// order lists hold handles into it. Dead pieces stay in the arena and the
/// order lists so a capture can be undone, but are absent from the grid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    pieces: Vec<Piece>,
    order: [Vec<PieceId>; 2],
    grid: Grid,
    current_turn: Color,
    opponent_turn: Color,
    pub(crate) en_passant_target: Option<EnPassantTarget>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) half_moves: u32,
    pub(crate) full_moves: u32,
    config: RulesConfig,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board, White to move, no castling rights.
    pub fn new() -> Self {
        Self::with_config(RulesConfig::default())
    }

    pub fn with_config(config: RulesConfig) -> Self {
        Board {
            pieces: Vec::new(),
            order: [Vec::new(), Vec::new()],
            grid: Self::create_empty_board(),
            current_turn: Color::White,
            opponent_turn: Color::Black,
            en_passant_target: None,
            castling_rights: CastlingRights::default(),
            half_moves: 0,
            full_moves: 1,
            config,
        }
    }

    /// Drop all position state. The rules configuration is kept.
    pub fn reset(&mut self) {
        *self = Self::with_config(self.config);
    }

    pub fn create_empty_board() -> Grid {
        [[None; BOARD_WIDTH]; BOARD_HEIGHT]
    }

    /// Put a new live piece on the board during setup. Kings go to the front
    /// of their colour's list. Rejected placements are logged and leave the
    /// board untouched.
    pub fn place_initial_piece(
        &mut self,
        piece_type: PieceType,
        color: Color,
        x: i32,
        y: i32,
    ) -> Result<PieceId, PlacementError> {
        if !Self::inside_board(x, y) {
            warn!("{piece_type:?} cannot be placed outside the board at ({x}, {y})");
            return Err(PlacementError::OutOfBounds { x, y });
        }
        let (x, y) = (x as usize, y as usize);
        if self.get_piece(x, y).is_some() {
            warn!("{piece_type:?} cannot be placed on top of another piece at ({x}, {y})");
            return Err(PlacementError::Occupied { x, y });
        }

        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(piece_type, color, x, y));
        let list = &mut self.order[color.index()];
        if piece_type == PieceType::King {
            list.insert(0, id);
        } else {
            list.push(id);
        }
        self.set_piece(x, y, Some(id));
        Ok(id)
    }

    /// Raw cell read. Callers must have checked the coordinates.
    pub fn get_piece(&self, x: usize, y: usize) -> Option<PieceId> {
        self.grid[y][x]
    }

    /// Raw cell write. Callers must have checked the coordinates.
    pub fn set_piece(&mut self, x: usize, y: usize, piece: Option<PieceId>) {
        self.grid[y][x] = piece;
    }

    pub fn piece_at(&self, x: usize, y: usize) -> Option<&Piece> {
        self.get_piece(x, y).map(|id| self.piece(id))
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0]
    }

    pub fn inside_board(x: i32, y: i32) -> bool {
        (0..BOARD_WIDTH as i32).contains(&x) && (0..BOARD_HEIGHT as i32).contains(&y)
    }

    /// All pieces of a colour, dead ones included, king first.
    pub fn pieces(&self, color: Color) -> &[PieceId] {
        &self.order[color.index()]
    }

    pub fn living_pieces(&self, color: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.order[color.index()]
            .iter()
            .copied()
            .filter(move |&id| self.piece(id).alive)
    }

    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.order[color.index()]
            .first()
            .copied()
            .filter(|&id| self.piece(id).piece_type == PieceType::King)
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn opponent_turn(&self) -> Color {
        self.opponent_turn
    }

    pub(crate) fn set_turn(&mut self, color: Color) {
        self.current_turn = color;
        self.opponent_turn = color.opposite();
    }

    pub fn switch_turn(&mut self) {
        self.set_turn(self.opponent_turn);
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<EnPassantTarget> {
        self.en_passant_target
    }

    pub fn half_moves(&self) -> u32 {
        self.half_moves
    }

    pub fn full_moves(&self) -> u32 {
        self.full_moves
    }

    pub fn config(&self) -> RulesConfig {
        self.config
    }

    pub fn set_config(&mut self, config: RulesConfig) {
        self.config = config;
    }

    /// Call after the mover's move, before `switch_turn`.
    pub fn update_full_moves(&mut self) {
        if self.current_turn == Color::Black {
            self.full_moves = self.full_moves.saturating_add(1);
        }
    }

    /// Call after the mover's move, before `switch_turn`.
    pub fn update_half_moves(&mut self, mv: &Move) {
        let pawn_move = self.piece(mv.piece).piece_type == PieceType::Pawn
            || matches!(
                mv.move_type,
                MoveType::DoublePush | MoveType::EnPassant | MoveType::Promotion
            );
        if pawn_move || mv.target.is_some() {
            self.half_moves = 0;
            return;
        }
        match self.config.halfmove_counting {
            HalfmoveCounting::PerFullMove => {
                if self.current_turn == Color::Black {
                    self.half_moves = self.half_moves.saturating_add(1);
                }
            }
            HalfmoveCounting::PerPly => self.half_moves = self.half_moves.saturating_add(1),
        }
    }

    pub fn fifty_move_rule_reached(&self) -> bool {
        self.half_moves >= self.config.fifty_move_limit
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for y in 0..BOARD_HEIGHT {
            let rank = BOARD_HEIGHT - y;
            write!(f, "{rank} ")?;
            for x in 0..BOARD_WIDTH {
                let c = self.piece_at(x, y).map(|p| p.fen_char()).unwrap_or('.');
                write!(f, "{c}")?;
                if x < BOARD_WIDTH - 1 {
                    write!(f, " ")?;
                }
            }
            writeln!(f, " {rank}")?;
        }
        write!(f, "  a b c d e f g h")
    }
}
