//! Legal move filtering: generate the candidate move, apply it, then test
//! whether the moving side's own king is attacked in the resulting position
//! (spec §4.1). Castling additionally requires the king not be in check and
//! not pass through an attacked square; `movegen::add_castling_moves`
//! already enforces that at generation time, so no extra work is needed here.

use crate::chess::apply::apply_unchecked;
use crate::chess::attacks::is_in_check;
use crate::chess::board::Board;
use crate::chess::movegen::pseudo_legal_moves;
use crate::chess::mv::Move;

pub fn legal_moves(board: &Board) -> Vec<Move> {
    let side = board.side_to_move;
    pseudo_legal_moves(board)
        .into_iter()
        .filter(|&mv| {
            let after = apply_unchecked(board, mv);
            !is_in_check(&after, side)
        })
        .collect()
}
