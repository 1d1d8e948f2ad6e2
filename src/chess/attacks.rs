//! Attack detection, independent of move generation.
//!
//! Shares the same ray/offset tables movegen uses, but only ever answers
//! "is this square attacked by that color", scanning *from* the square
//! outward. It never calls into move generation, so king-safety filtering in
//! `movegen` can call this without recursion (spec §4.1).

use crate::chess::board::Board;
use crate::chess::piece::{Color, Kind};
use crate::chess::position::Position;

pub const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub fn is_square_attacked(board: &Board, square: Position, by: Color) -> bool {
    // Pawns: a square is attacked by a pawn standing one rank "behind" it
    // from that pawn's own forward direction.
    let pawn_dir = by.pawn_direction();
    for df in [-1i8, 1i8] {
        if let Some(origin) = square.offset(-pawn_dir, df) {
            if let Some(piece) = board.piece_at(origin) {
                if piece.color == by && piece.kind == Kind::Pawn {
                    return true;
                }
            }
        }
    }

    for (dr, df) in KNIGHT_OFFSETS {
        if let Some(origin) = square.offset(dr, df) {
            if let Some(piece) = board.piece_at(origin) {
                if piece.color == by && piece.kind == Kind::Knight {
                    return true;
                }
            }
        }
    }

    for (dr, df) in KING_OFFSETS {
        if let Some(origin) = square.offset(dr, df) {
            if let Some(piece) = board.piece_at(origin) {
                if piece.color == by && piece.kind == Kind::King {
                    return true;
                }
            }
        }
    }

    for &(dr, df) in ROOK_DIRS.iter() {
        if ray_hits(board, square, dr, df, by, &[Kind::Rook, Kind::Queen]) {
            return true;
        }
    }
    for &(dr, df) in BISHOP_DIRS.iter() {
        if ray_hits(board, square, dr, df, by, &[Kind::Bishop, Kind::Queen]) {
            return true;
        }
    }

    false
}

fn ray_hits(
    board: &Board,
    from: Position,
    dr: i8,
    df: i8,
    by: Color,
    kinds: &[Kind],
) -> bool {
    let mut current = from;
    while let Some(next) = current.offset(dr, df) {
        current = next;
        if let Some(piece) = board.piece_at(current) {
            return piece.color == by && kinds.contains(&piece.kind);
        }
    }
    false
}

pub fn king_square(board: &Board, color: Color) -> Option<Position> {
    for index in 0..64 {
        let pos = Position::from_index(index);
        if let Some(piece) = board.piece_at(pos) {
            if piece.kind == Kind::King && piece.color == color {
                return Some(pos);
            }
        }
    }
    None
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match king_square(board, color) {
        Some(square) => is_square_attacked(board, square, color.opposite()),
        // A missing king is a malformed position; treat as not in check rather
        // than panicking — callers validating FEN catch this earlier.
        None => false,
    }
}
