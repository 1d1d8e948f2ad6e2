//! Terminal-status detection, checked in the order spec §4.1 prescribes:
//! checkmate, stalemate, fifty-move rule, threefold repetition, insufficient
//! material, else ongoing.

use crate::chess::attacks::is_in_check;
use crate::chess::board::Board;
use crate::chess::legal::legal_moves;
use crate::chess::piece::{Color, Kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameStatus {
    Ongoing,
    WhiteWins,
    BlackWins,
    DrawStalemate,
    DrawInsufficientMaterial,
    DrawFiftyMove,
    DrawRepetition,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

pub fn status(board: &Board) -> GameStatus {
    let side = board.side_to_move;
    let moves = legal_moves(board);

    if moves.is_empty() {
        return if is_in_check(board, side) {
            match side {
                Color::White => GameStatus::BlackWins,
                Color::Black => GameStatus::WhiteWins,
            }
        } else {
            GameStatus::DrawStalemate
        };
    }

    if board.halfmove_clock >= 100 {
        return GameStatus::DrawFiftyMove;
    }

    if board.repetition_count() >= 3 {
        return GameStatus::DrawRepetition;
    }

    if is_insufficient_material(board) {
        return GameStatus::DrawInsufficientMaterial;
    }

    GameStatus::Ongoing
}

fn is_insufficient_material(board: &Board) -> bool {
    let mut minor_pieces: Vec<(Color, Kind, bool)> = Vec::new();
    for (pos, piece) in board.iter_pieces() {
        match piece.kind {
            Kind::King => continue,
            Kind::Pawn | Kind::Rook | Kind::Queen => return false,
            Kind::Knight | Kind::Bishop => {
                let square_is_light = (pos.rank + pos.file) % 2 == 0;
                minor_pieces.push((piece.color, piece.kind, square_is_light));
            }
        }
    }

    match minor_pieces.as_slice() {
        [] => true,
        [(_, Kind::Knight, _)] | [(_, Kind::Bishop, _)] => true,
        [(c1, Kind::Bishop, l1), (c2, Kind::Bishop, l2)] => c1 != c2 && l1 == l2,
        _ => false,
    }
}
