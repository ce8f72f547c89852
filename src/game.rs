// =============================================================================
// Game controller
//
// Drives the per-ply cycle on top of the rules engine: compute the legal
// moves and game state for the side to move, accept one of those moves from
// the caller (a UI, the random player, a test), commit it and record the new
// position in the history. Also exposes the read-only view a renderer needs.
// =============================================================================

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::board::{Board, RulesConfig, BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::{GameError, HistoryError};
use crate::fen::STARTING_FEN;
use crate::history::History;
use crate::moves::{parse_uci, Move, MoveType};
use crate::piece::{Color, PieceType};
use crate::rules::{Engine, GameState};

pub struct Game {
    engine: Engine,
    history: History,
    in_check: bool,
    legal_moves: Vec<Move>,
    state: GameState,
    last_move: Option<Move>,
}

#[derive(Serialize, Debug)]
pub struct SquarePiece {
    pub piece_type: PieceType,
    pub color: Color,
}

#[derive(Serialize, Debug)]
pub struct MoveView {
    pub from: [usize; 2],
    pub to: [usize; 2],
    pub move_type: MoveType,
    pub uci: String,
}

impl From<&Move> for MoveView {
    fn from(mv: &Move) -> Self {
        MoveView {
            from: [mv.piece_x, mv.piece_y],
            to: [mv.target_x, mv.target_y],
            move_type: mv.move_type,
            uci: mv.to_uci(),
        }
    }
}

/// Everything a renderer draws for one frame. `squares` is indexed `[y][x]`.
#[derive(Serialize, Debug)]
pub struct Snapshot {
    pub fen: String,
    pub squares: Vec<Vec<Option<SquarePiece>>>,
    pub current_turn: Color,
    pub in_check: bool,
    pub state: GameState,
    pub legal_moves: Vec<MoveView>,
    pub last_move: Option<MoveView>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::starting_position(), History::new(STARTING_FEN.to_string()))
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Self::with_config(fen, RulesConfig::default())
    }

    pub fn with_config(fen: &str, config: RulesConfig) -> Result<Self, GameError> {
        let mut board = Board::with_config(config);
        board.load_fen(fen)?;
        Ok(Self::from_board(board, History::new(fen.to_string())))
    }

    /// Resume from a recorded history, at its current position.
    pub fn from_history(history: History, config: RulesConfig) -> Result<Self, GameError> {
        let mut board = Board::with_config(config);
        board.load_fen(history.current())?;
        Ok(Self::from_board(board, history))
    }

    fn from_board(board: Board, history: History) -> Self {
        let mut game = Game {
            engine: Engine::new(board),
            history,
            in_check: false,
            legal_moves: Vec::new(),
            state: GameState::Nothing,
            last_move: None,
        };
        game.start_new_turn();
        game
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    fn start_new_turn(&mut self) {
        let (in_check, legal_moves) = self.engine.current_legal_moves();
        self.in_check = in_check;
        self.state = self.engine.is_gameover(in_check, legal_moves.len());
        self.legal_moves = if self.state.is_terminal() {
            Vec::new()
        } else {
            legal_moves
        };
    }

    /// Legal moves of the piece on (x, y), for move markers.
    pub fn moves_from(&self, x: usize, y: usize) -> impl Iterator<Item = &Move> + '_ {
        self.legal_moves
            .iter()
            .filter(move |m| m.piece_x == x && m.piece_y == y)
    }

    pub fn find_move(&self, from: (usize, usize), to: (usize, usize)) -> Option<Move> {
        self.legal_moves
            .iter()
            .find(|m| m.from() == from && m.to() == to)
            .copied()
    }

    pub fn move_from_uci(&self, uci: &str) -> Result<Move, GameError> {
        let (from, to) = parse_uci(uci).ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        self.find_move(from, to)
            .ok_or_else(|| GameError::IllegalMove(uci.to_string()))
    }

    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.legal_moves.choose(rng).copied()
    }

    /// Commit a move from the current legal set and start the next turn.
    pub fn perform_turn(&mut self, mv: Move) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.legal_moves.contains(&mv) {
            return Err(GameError::IllegalMove(mv.to_uci()));
        }

        self.engine.commit_move(&mv);
        self.last_move = Some(mv);
        self.history.push(self.engine.board().to_fen());
        self.start_new_turn();
        if self.is_over() {
            info!("game over after {}: {:?}", mv.to_uci(), self.state);
        }
        Ok(())
    }

    pub fn play_uci(&mut self, uci: &str) -> Result<Move, GameError> {
        let mv = self.move_from_uci(uci)?;
        self.perform_turn(mv)?;
        Ok(mv)
    }

    /// Step through the history. Each returns whether the position changed.
    /// A recorded position that fails to load leaves the game where it was.
    pub fn step_back(&mut self) -> Result<bool, GameError> {
        let previous = self.history.index();
        self.history.step_back();
        self.shift_position(previous)
    }

    pub fn step_forward(&mut self) -> Result<bool, GameError> {
        let previous = self.history.index();
        self.history.step_forward();
        self.shift_position(previous)
    }

    pub fn jump_to_start(&mut self) -> Result<bool, GameError> {
        let previous = self.history.index();
        self.history.jump_to_start();
        self.shift_position(previous)
    }

    pub fn jump_to_end(&mut self) -> Result<bool, GameError> {
        let previous = self.history.index();
        self.history.jump_to_end();
        self.shift_position(previous)
    }

    fn shift_position(&mut self, previous: usize) -> Result<bool, GameError> {
        if self.history.index() == previous {
            return Ok(false);
        }
        let mut board = Board::with_config(self.board().config());
        if let Err(err) = board.load_fen(self.history.current()) {
            self.history.jump_to(previous);
            return Err(err.into());
        }
        *self.engine.board_mut() = board;
        self.last_move = None;
        self.start_new_turn();
        Ok(true)
    }

    pub fn save_history(&self, path: impl AsRef<std::path::Path>) -> Result<(), HistoryError> {
        self.history.save(path)
    }

    pub fn snapshot(&self) -> Snapshot {
        let board = self.board();
        let squares = (0..BOARD_HEIGHT)
            .map(|y| {
                (0..BOARD_WIDTH)
                    .map(|x| {
                        board.piece_at(x, y).map(|p| SquarePiece {
                            piece_type: p.piece_type,
                            color: p.color,
                        })
                    })
                    .collect()
            })
            .collect();

        Snapshot {
            fen: board.to_fen(),
            squares,
            current_turn: board.current_turn(),
            in_check: self.in_check,
            state: self.state,
            legal_moves: self.legal_moves.iter().map(MoveView::from).collect(),
            last_move: self.last_move.as_ref().map(MoveView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_game_has_twenty_moves() {
        let game = Game::new();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.state(), GameState::Nothing);
        assert!(!game.in_check());
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn moves_from_selected_square() {
        let game = Game::new();
        let targets: Vec<_> = game.moves_from(6, 7).map(|m| m.to()).collect();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&(5, 5)));
        assert_eq!(game.moves_from(4, 4).count(), 0);
    }

    #[test]
    fn illegal_moves_are_rejected_before_the_engine() {
        let mut game = Game::new();
        let fen = game.board().to_fen();
        assert!(matches!(game.play_uci("e2e5"), Err(GameError::IllegalMove(_))));
        assert!(matches!(game.play_uci("nonsense"), Err(GameError::IllegalMove(_))));

        // a move that was legal in another position is still refused
        let mut other = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let castle = other.move_from_uci("e1c1").unwrap();
        assert!(matches!(game.perform_turn(castle), Err(GameError::IllegalMove(_))));
        other.perform_turn(castle).unwrap();

        assert_eq!(game.board().to_fen(), fen);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn committed_moves_are_recorded() {
        let mut game = Game::new();
        game.play_uci("e2e4").unwrap();
        game.play_uci("e7e5").unwrap();
        assert_eq!(
            game.history().positions()[1],
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(
            game.board().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
        assert_eq!(game.last_move().map(|m| m.to_uci()), Some("e7e5".to_string()));
    }

    #[test]
    fn checkmate_ends_the_game() {
        let mut game = Game::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.play_uci(uci).unwrap();
        }
        assert_eq!(game.state(), GameState::Checkmate);
        assert!(game.in_check());
        assert!(game.is_over());
        assert!(game.legal_moves().is_empty());

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(game.random_move(&mut rng), None);
        let stale = game.board().clone();
        let mv = Move {
            move_type: MoveType::Move,
            piece: stale.get_piece(4, 7).unwrap(),
            piece_x: 4,
            piece_y: 7,
            target: None,
            target_x: 5,
            target_y: 6,
        };
        assert!(matches!(game.perform_turn(mv), Err(GameError::GameOver)));
    }

    #[test]
    fn fifty_move_rule_ends_the_game() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K1N1 w - - 50 90").unwrap();
        assert_eq!(game.state(), GameState::Stalemate);
        assert!(game.legal_moves().is_empty());

        let standard = Game::with_config("4k3/8/8/8/8/8/8/4K1N1 w - - 50 90", RulesConfig::standard())
            .unwrap();
        assert_eq!(standard.state(), GameState::Nothing);
    }

    #[test]
    fn time_travel_reloads_positions() {
        let mut game = Game::new();
        game.play_uci("e2e4").unwrap();
        game.play_uci("e7e5").unwrap();

        assert!(game.step_back().unwrap());
        assert_eq!(game.board().current_turn(), Color::Black);
        assert!(game.last_move().is_none());
        assert_eq!(game.history().index(), 1);

        assert!(game.jump_to_start().unwrap());
        assert_eq!(game.legal_moves().len(), 20);
        assert!(!game.step_back().unwrap());

        assert!(game.jump_to_end().unwrap());
        assert_eq!(game.board().to_fen(), game.history().positions()[2]);

        // branching from an earlier position drops the old continuation
        game.step_back().unwrap();
        game.play_uci("c7c5").unwrap();
        assert_eq!(game.history().len(), 3);
        assert!(game.history().current().starts_with("rnbqkbnr/pp1ppppp/"));
    }

    #[test]
    fn resumes_from_saved_history() {
        let mut game = Game::new();
        game.play_uci("d2d4").unwrap();
        let text = game.history().to_text();

        let history = History::from_text(&text).unwrap();
        let mut resumed = Game::from_history(history, RulesConfig::default()).unwrap();
        assert_eq!(resumed.board().to_fen(), STARTING_FEN);
        resumed.jump_to_end().unwrap();
        assert_eq!(resumed.board().to_fen(), game.board().to_fen());
    }

    #[test]
    fn random_play_stays_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = Game::new();
        for _ in 0..200 {
            let Some(mv) = game.random_move(&mut rng) else { break };
            game.perform_turn(mv).unwrap();

            let board = game.board();
            for color in [Color::White, Color::Black] {
                let king = board.king(color).expect("king never leaves the list");
                assert!(board.piece(king).alive);
                for &id in board.pieces(color) {
                    let p = board.piece(id);
                    if p.alive {
                        assert_eq!(board.get_piece(p.x, p.y), Some(id));
                    }
                }
            }
            assert_ne!(board.current_turn(), board.opponent_turn());
            let reloaded = Board::from_fen(&board.to_fen()).unwrap();
            assert_eq!(reloaded.to_fen(), board.to_fen());
        }
    }

    #[test]
    fn unreadable_history_line_keeps_the_current_position() {
        let history = History::from_text(&format!("{STARTING_FEN}\nnot a fen\n")).unwrap();
        let mut game = Game::from_history(history, RulesConfig::default()).unwrap();

        assert!(matches!(game.step_forward(), Err(GameError::Fen(_))));
        assert_eq!(game.history().index(), 0);
        assert_eq!(game.board().to_fen(), STARTING_FEN);
        assert_eq!(game.legal_moves().len(), 20);

        assert!(matches!(game.jump_to_end(), Err(GameError::Fen(_))));
        assert_eq!(game.history().index(), 0);

        let mv = game.legal_moves()[0];
        game.perform_turn(mv).unwrap();
        assert_eq!(game.history().len(), 2);
        assert_ne!(game.history().current(), "not a fen");
        assert_eq!(game.board().current_turn(), Color::Black);
    }

    #[test]
    fn snapshot_serializes_for_the_renderer() {
        let mut game = Game::new();
        game.play_uci("g1f3").unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.squares.len(), 8);
        assert_eq!(snapshot.current_turn, Color::Black);
        assert_eq!(snapshot.legal_moves.len(), 20);
        assert_eq!(snapshot.last_move.as_ref().map(|m| m.to), Some([5, 5]));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["current_turn"], "Black");
        assert_eq!(json["state"], "Nothing");
        assert_eq!(json["squares"][0][4]["piece_type"], "King");
        assert_eq!(json["last_move"]["uci"], "g1f3");
    }
}
