// =============================================================================
// Pseudo-legal move generation
//
// Pure functions over a Board. Nothing here checks whether the mover's king
// is left in check; castling only checks rights, the king/rook placement and
// that the squares between them are empty. The rules engine filters the rest.
//
// Coordinate system: x = file (0 = a), y = row (0 = rank 8). White pawns move
// toward row 0, Black pawns toward row 7.
// =============================================================================

use crate::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
use crate::moves::{Move, MoveType};
use crate::piece::{Color, PieceId, PieceType};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, -1), (2, 1), (-1, -2), (1, -2),
    (-2, -1), (-2, 1), (1, 2), (-1, 2),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1), (-1, 0),
    (1, 0), (-1, 1), (0, 1), (1, 1),
];

const BISHOP_DIRS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const QUEEN_DIRS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1), (-1, 0),
    (1, 0), (-1, 1), (0, 1), (1, 1),
];

/// File the king must stand on for castling to be generated.
const KING_HOME_FILE: usize = 4;

pub fn generate_moves(board: &Board, id: PieceId) -> Vec<Move> {
    let mut moves = Vec::new();
    generate_moves_into(board, id, &mut moves);
    moves
}

/// Append the pseudo-legal moves of `id` to `moves`.
pub fn generate_moves_into(board: &Board, id: PieceId, moves: &mut Vec<Move>) {
    match board.piece(id).piece_type {
        PieceType::Pawn => generate_pawn_moves(board, id, moves),
        PieceType::Knight => generate_leaper_moves(board, id, &KNIGHT_OFFSETS, moves),
        PieceType::Bishop => generate_sliding_moves(board, id, &BISHOP_DIRS, moves),
        PieceType::Rook => generate_sliding_moves(board, id, &ROOK_DIRS, moves),
        PieceType::Queen => generate_sliding_moves(board, id, &QUEEN_DIRS, moves),
        PieceType::King => {
            generate_leaper_moves(board, id, &KING_OFFSETS, moves);
            generate_castling_moves(board, id, moves);
        }
    }
}

/// Whether the piece `id` attacks (x, y). Pawns attack their two forward
/// diagonals whether or not anything stands there; castling never attacks.
pub fn attacks_square(board: &Board, id: PieceId, x: usize, y: usize) -> bool {
    let piece = board.piece(id);
    let (px, py) = (piece.x as i32, piece.y as i32);
    let (x, y) = (x as i32, y as i32);
    match piece.piece_type {
        PieceType::Pawn => y == py + piece.color.pawn_direction() && (x - px).abs() == 1,
        PieceType::King => KING_OFFSETS
            .iter()
            .any(|&(dx, dy)| px + dx == x && py + dy == y),
        _ => {
            let mut moves = Vec::new();
            generate_moves_into(board, id, &mut moves);
            moves
                .iter()
                .any(|m| m.target_x as i32 == x && m.target_y as i32 == y)
        }
    }
}

fn make_move(
    board: &Board,
    id: PieceId,
    move_type: MoveType,
    target: Option<PieceId>,
    target_x: usize,
    target_y: usize,
) -> Move {
    let piece = board.piece(id);
    Move {
        move_type,
        piece: id,
        piece_x: piece.x,
        piece_y: piece.y,
        target,
        target_x,
        target_y,
    }
}

fn generate_pawn_moves(board: &Board, id: PieceId, moves: &mut Vec<Move>) {
    let pawn = *board.piece(id);
    let dir = pawn.color.pawn_direction();
    let (x, y) = (pawn.x as i32, pawn.y as i32);
    let forward = y + dir;
    let promotes = forward == 0 || forward == BOARD_HEIGHT as i32 - 1;
    let start_row = match pawn.color {
        Color::White => BOARD_HEIGHT - 2,
        Color::Black => 1,
    };

    // Single and double push
    if Board::inside_board(x, forward) && board.get_piece(pawn.x, forward as usize).is_none() {
        let move_type = if promotes { MoveType::Promotion } else { MoveType::Move };
        moves.push(make_move(board, id, move_type, None, pawn.x, forward as usize));

        let double = forward + dir;
        if pawn.y == start_row
            && Board::inside_board(x, double)
            && board.get_piece(pawn.x, double as usize).is_none()
        {
            moves.push(make_move(board, id, MoveType::DoublePush, None, pawn.x, double as usize));
        }
    }

    // Captures, including en passant
    for dx in [-1i32, 1] {
        let nx = x + dx;
        if !Board::inside_board(nx, forward) {
            continue;
        }
        let (tx, ty) = (nx as usize, forward as usize);

        if let Some(target) = board.get_piece(tx, ty) {
            if board.piece(target).color != pawn.color {
                let move_type = if promotes { MoveType::Promotion } else { MoveType::Capture };
                moves.push(make_move(board, id, move_type, Some(target), tx, ty));
            }
        }

        if let Some(ep) = board.en_passant_target() {
            if ep.x == tx && ep.y == ty && board.piece(ep.pawn).color != pawn.color {
                moves.push(make_move(board, id, MoveType::EnPassant, Some(ep.pawn), tx, ty));
            }
        }
    }
}

fn generate_leaper_moves(
    board: &Board,
    id: PieceId,
    offsets: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    let piece = *board.piece(id);
    for (dx, dy) in offsets {
        let nx = piece.x as i32 + dx;
        let ny = piece.y as i32 + dy;
        if !Board::inside_board(nx, ny) {
            continue;
        }
        let (tx, ty) = (nx as usize, ny as usize);
        match board.get_piece(tx, ty) {
            None => moves.push(make_move(board, id, MoveType::Move, None, tx, ty)),
            Some(target) if board.piece(target).color != piece.color => {
                moves.push(make_move(board, id, MoveType::Capture, Some(target), tx, ty));
            }
            Some(_) => {}
        }
    }
}

fn generate_sliding_moves(
    board: &Board,
    id: PieceId,
    directions: &[(i32, i32)],
    moves: &mut Vec<Move>,
) {
    let piece = *board.piece(id);
    for (dx, dy) in directions {
        let mut nx = piece.x as i32 + dx;
        let mut ny = piece.y as i32 + dy;
        while Board::inside_board(nx, ny) {
            let (tx, ty) = (nx as usize, ny as usize);
            if let Some(target) = board.get_piece(tx, ty) {
                if board.piece(target).color != piece.color {
                    moves.push(make_move(board, id, MoveType::Capture, Some(target), tx, ty));
                }
                break;
            }
            moves.push(make_move(board, id, MoveType::Move, None, tx, ty));
            nx += dx;
            ny += dy;
        }
    }
}

fn generate_castling_moves(board: &Board, id: PieceId, moves: &mut Vec<Move>) {
    let king = *board.piece(id);
    let back_rank = king.color.back_rank();
    if king.y != back_rank || king.x != KING_HOME_FILE {
        return;
    }

    let empty = |x: usize| board.get_piece(x, back_rank).is_none();
    let own_rook = |x: usize| {
        board
            .piece_at(x, back_rank)
            .map(|p| p.piece_type == PieceType::Rook && p.color == king.color)
            .unwrap_or(false)
    };
    let rights = board.castling_rights();

    // Kingside: the two squares between king and rook must be empty
    if rights.kingside(king.color)
        && (KING_HOME_FILE + 1..BOARD_WIDTH - 1).all(empty)
        && own_rook(BOARD_WIDTH - 1)
    {
        moves.push(make_move(
            board,
            id,
            MoveType::CastleKingSide,
            None,
            KING_HOME_FILE + 2,
            back_rank,
        ));
    }

    // Queenside: the three squares between king and rook must be empty
    if rights.queenside(king.color) && (1..KING_HOME_FILE).all(empty) && own_rook(0) {
        moves.push(make_move(
            board,
            id,
            MoveType::CastleQueenSide,
            None,
            KING_HOME_FILE - 2,
            back_rank,
        ));
    }
}
