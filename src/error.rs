use thiserror::Error;

use crate::piece::Color;

/// Malformed FEN input. A board that fails to load is left in its reset state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 space-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid piece character '{0}' in board layout")]
    InvalidPiece(char),

    #[error("invalid empty-square count '{0}'")]
    InvalidEmptyRun(char),

    #[error("invalid side-to-move field: {0}")]
    InvalidSide(String),

    #[error("invalid castling rights character: {0}")]
    InvalidCastling(char),

    #[error("invalid en-passant square: {0}")]
    InvalidSquare(String),

    #[error("invalid {field}: {value}")]
    InvalidCounter { field: &'static str, value: String },

    #[error("{} has {count} kings, expected exactly one", .color.name())]
    KingCount { color: Color, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("square ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("square ({x}, {y}) is already occupied")]
    Occupied { x: usize, y: usize },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("game is already over")]
    GameOver,

    #[error(transparent)]
    Fen(#[from] FenError),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history contains no positions")]
    Empty,
}
