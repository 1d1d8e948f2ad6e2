//! Pseudo-legal move generation: sliding pieces via ray iteration stopping at
//! the first occupied square, knight/king via offset tables, pawns handled
//! as a special case (pushes, promotions, en passant, double push).
//! King safety is *not* checked here — see `legal.rs`.

use crate::chess::attacks::{is_square_attacked, BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::chess::board::Board;
use crate::chess::mv::Move;
use crate::chess::piece::{Color, Kind};
use crate::chess::position::Position;

pub fn pseudo_legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    let side = board.side_to_move;
    for (from, piece) in board.iter_pieces() {
        if piece.color != side {
            continue;
        }
        match piece.kind {
            Kind::Pawn => pawn_moves(board, from, side, &mut moves),
            Kind::Knight => stepper_moves(board, from, side, &KNIGHT_OFFSETS, &mut moves),
            Kind::King => stepper_moves(board, from, side, &KING_OFFSETS, &mut moves),
            Kind::Rook => slider_moves(board, from, side, &ROOK_DIRS, &mut moves),
            Kind::Bishop => slider_moves(board, from, side, &BISHOP_DIRS, &mut moves),
            Kind::Queen => {
                slider_moves(board, from, side, &ROOK_DIRS, &mut moves);
                slider_moves(board, from, side, &BISHOP_DIRS, &mut moves);
            }
        }
    }
    add_castling_moves(board, side, &mut moves);
    moves
}

fn stepper_moves(board: &Board, from: Position, side: Color, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(dr, df) in offsets {
        if let Some(to) = from.offset(dr, df) {
            match board.piece_at(to) {
                Some(occupant) if occupant.color == side => continue,
                _ => out.push(Move::new(from, to)),
            }
        }
    }
}

fn slider_moves(board: &Board, from: Position, side: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(dr, df) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(dr, df) {
            current = to;
            match board.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(occupant) => {
                    if occupant.color != side {
                        out.push(Move::new(from, to));
                    }
                    break;
                }
            }
        }
    }
}

const PROMOTION_KINDS: [Kind; 4] = [Kind::Queen, Kind::Rook, Kind::Bishop, Kind::Knight];

fn push_pawn_move(from: Position, to: Position, promotion_rank: usize, out: &mut Vec<Move>) {
    if to.rank as usize == promotion_rank {
        for kind in PROMOTION_KINDS {
            out.push(Move::promoting(from, to, kind));
        }
    } else {
        out.push(Move::new(from, to));
    }
}

fn pawn_moves(board: &Board, from: Position, side: Color, out: &mut Vec<Move>) {
    let dir = side.pawn_direction();
    let promotion_rank = side.promotion_rank();

    if let Some(one) = from.offset(dir, 0) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, promotion_rank, out);
            if from.rank as usize == side.pawn_start_rank() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.piece_at(two).is_none() {
                        out.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    for df in [-1i8, 1i8] {
        if let Some(to) = from.offset(dir, df) {
            if let Some(occupant) = board.piece_at(to) {
                if occupant.color != side {
                    push_pawn_move(from, to, promotion_rank, out);
                }
            } else if Some(to) == board.en_passant_target {
                out.push(Move::new(from, to));
            }
        }
    }
}

fn add_castling_moves(board: &Board, side: Color, out: &mut Vec<Move>) {
    let rank = side.home_rank() as i8;
    let king_from = Position::new(rank, 4);
    if board.piece_at(king_from).map(|p| p.kind) != Some(Kind::King) {
        return;
    }
    if is_square_attacked(board, king_from, side.opposite()) {
        return;
    }

    let (king_side_right, queen_side_right) = match side {
        Color::White => (board.castling.white_king_side, board.castling.white_queen_side),
        Color::Black => (board.castling.black_king_side, board.castling.black_queen_side),
    };

    if king_side_right {
        let f = Position::new(rank, 5);
        let g = Position::new(rank, 6);
        let h = Position::new(rank, 7);
        let rook_ok = board.piece_at(h) == Some(crate::chess::piece::Piece::new(Kind::Rook, side));
        if rook_ok
            && board.piece_at(f).is_none()
            && board.piece_at(g).is_none()
            && !is_square_attacked(board, f, side.opposite())
            && !is_square_attacked(board, g, side.opposite())
        {
            out.push(Move::new(king_from, g));
        }
    }

    if queen_side_right {
        let d = Position::new(rank, 3);
        let c = Position::new(rank, 2);
        let b = Position::new(rank, 1);
        let a = Position::new(rank, 0);
        let rook_ok = board.piece_at(a) == Some(crate::chess::piece::Piece::new(Kind::Rook, side));
        if rook_ok
            && board.piece_at(d).is_none()
            && board.piece_at(c).is_none()
            && board.piece_at(b).is_none()
            && !is_square_attacked(board, d, side.opposite())
            && !is_square_attacked(board, c, side.opposite())
        {
            out.push(Move::new(king_from, c));
        }
    }
}
