//! Action space: fixed 4096-index space (`from * 64 + to`), queen-only
//! promotion (decided in DESIGN.md — the full underpromotion variant would
//! add 64 indices for vanishingly rare moves). The chess engine itself still
//! enumerates full underpromotion variety in `legal_moves` for rules
//! correctness; this layer collapses all four promotion kinds for a given
//! from/to pair onto the queen-promotion index.

use crate::chess::{Board, Kind, Move, Position};
use std::collections::BTreeSet;

pub const ACTION_SPACE_SIZE: usize = 4096;

pub fn encode_action(mv: Move) -> u16 {
    (mv.from.index() * 64 + mv.to.index()) as u16
}

/// Decodes an index into a from/to pair with no promotion kind attached —
/// callers must look up the matching legal move to recover promotion intent.
pub fn decode_action(index: u16) -> (Position, Position) {
    let index = index as usize;
    (Position::from_index(index / 64), Position::from_index(index % 64))
}

/// The set of action indices legal in `board`, collapsing underpromotions
/// onto the queen-promotion index so the index space stays exactly 4096.
pub fn legal_action_indices(board: &Board) -> BTreeSet<u16> {
    crate::chess::legal_moves(board)
        .into_iter()
        .filter(|mv| mv.promotion.is_none() || mv.promotion == Some(Kind::Queen))
        .map(encode_action)
        .collect()
}

/// Resolves an action index back to a concrete legal `Move`, attaching the
/// queen promotion kind when the index corresponds to a promoting move.
pub fn resolve_move(board: &Board, index: u16) -> Option<Move> {
    let (from, to) = decode_action(index);
    crate::chess::legal_moves(board)
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && (mv.promotion.is_none() || mv.promotion == Some(Kind::Queen)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Board;

    #[test]
    fn encode_decode_roundtrip_drops_promotion() {
        let mv = Move::new(Position::new(1, 4), Position::new(3, 4));
        let index = encode_action(mv);
        let (from, to) = decode_action(index);
        assert_eq!((from, to), (mv.from, mv.to));
    }

    #[test]
    fn startpos_has_20_legal_action_indices() {
        let board = Board::new_game();
        assert_eq!(legal_action_indices(&board).len(), 20);
    }

    #[test]
    fn resolve_move_recovers_a_legal_move() {
        let board = Board::new_game();
        let index = *legal_action_indices(&board).iter().next().unwrap();
        assert!(resolve_move(&board, index).is_some());
    }
}
