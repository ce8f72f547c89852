use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// One FEN string per ply with a cursor for stepping through them. Stored on
/// disk as plain newline-separated FEN strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct History {
    positions: Vec<String>,
    index: usize,
}

impl History {
    pub fn new(initial_fen: String) -> Self {
        History {
            positions: vec![initial_fen],
            index: 0,
        }
    }

    /// Parse newline-separated FEN strings. Blank lines are skipped and the
    /// cursor starts at the first position.
    pub fn from_text(text: &str) -> Result<Self, HistoryError> {
        let positions: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if positions.is_empty() {
            return Err(HistoryError::Empty);
        }
        Ok(History { positions, index: 0 })
    }

    /// Positions up to and including the cursor, one per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for fen in &self.positions[..=self.index] {
            text.push_str(fen);
            text.push('\n');
        }
        text
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let text = fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn current(&self) -> &str {
        &self.positions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Record the position after a new move. Anything after the cursor is
    /// discarded first.
    pub fn push(&mut self, fen: String) {
        self.positions.truncate(self.index + 1);
        self.positions.push(fen);
        self.index += 1;
    }

    /// Move the cursor. Each returns false when it was already at the end.
    pub fn step_back(&mut self) -> bool {
        self.seek(self.index.saturating_sub(1))
    }

    pub fn step_forward(&mut self) -> bool {
        self.seek((self.index + 1).min(self.positions.len() - 1))
    }

    pub fn jump_to_start(&mut self) -> bool {
        self.seek(0)
    }

    pub fn jump_to_end(&mut self) -> bool {
        self.seek(self.positions.len() - 1)
    }

    /// Move the cursor to `index`, clamped to the last position.
    pub fn jump_to(&mut self, index: usize) -> bool {
        self.seek(index.min(self.positions.len() - 1))
    }

    fn seek(&mut self, index: usize) -> bool {
        let moved = index != self.index;
        self.index = index;
        moved
    }
}
