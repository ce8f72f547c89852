pub mod board;
pub mod error;
pub mod fen;
pub mod game;
pub mod history;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod rules;
